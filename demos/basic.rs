use grantc::{AclAction, EntityAction, SchemaBuilder};

fn main() {
    // Define the permission model
    let schema = SchemaBuilder::new()
        .role("Admin")
        .role("User")
        .entity("Customer", |e| {
            e.all_roles(EntityAction::View)
                .granular(EntityAction::Update, |p| {
                    p.role("Admin")
                        .role("User")
                        .field("creditLimit", ["Admin"])
                })
                .disabled(EntityAction::Delete)
        })
        .build();

    println!("{schema}");

    let grants = schema.compile().expect("failed to compile grants");
    println!("{grants}");
    for grant in &grants {
        println!("  {grant}");
    }

    match grants.find("User", "Customer", AclAction::UpdateAny) {
        Some(grant) => println!("User update attributes: {}", grant.attributes),
        None => println!("User may not update customers."),
    }
}
