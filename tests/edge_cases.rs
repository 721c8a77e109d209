use grantc::{
    AclAction, CompileError, Entity, EntityAction, Grant, GrantsModule, Permission,
    PermissionField, PermissionKind, PermissionRole, Role, SchemaBuilder,
};

fn grant(role: &str, resource: &str, action: AclAction, attributes: &str) -> Grant {
    Grant {
        role: role.into(),
        resource: resource.into(),
        action,
        attributes: attributes.into(),
    }
}

#[test]
fn all_roles_grants_every_role() {
    let grants = SchemaBuilder::new()
        .role("Admin")
        .role("User")
        .entity("Widget", |e| e.all_roles(EntityAction::Create))
        .compile()
        .unwrap();

    assert_eq!(
        grants.into_vec(),
        vec![
            grant("Admin", "Widget", AclAction::CreateAny, "*"),
            grant("User", "Widget", AclAction::CreateAny, "*"),
        ]
    );
}

#[test]
fn all_roles_ignores_field_restrictions() {
    let permission = Permission {
        action: EntityAction::View,
        kind: PermissionKind::AllRoles {
            fields: vec![PermissionField::new("secret", ["Admin"])],
        },
    };
    let entities = [Entity::new("Widget", vec![permission])];
    let roles = [Role::new("Admin"), Role::new("User")];

    let grants = grantc::compile(&entities, &roles).unwrap();
    assert_eq!(grants.len(), 2);
    assert!(grants.iter().all(|g| g.attributes == "*"));
}

#[test]
fn all_roles_with_no_roles_emits_nothing() {
    let grants = SchemaBuilder::new()
        .entity("Widget", |e| e.all_roles(EntityAction::Create))
        .compile()
        .unwrap();
    assert!(grants.is_empty());
}

#[test]
fn disabled_permission_emits_nothing_for_its_action() {
    let grants = SchemaBuilder::new()
        .role("Admin")
        .role("User")
        .entity("Widget", |e| {
            e.disabled(EntityAction::Delete)
                .all_roles(EntityAction::View)
        })
        .compile()
        .unwrap();

    assert_eq!(grants.len(), 2);
    assert!(grants.iter().all(|g| g.action == AclAction::ReadOwn));
    assert!(grants.iter().all(|g| g.action != AclAction::DeleteAny));
}

#[test]
fn granular_single_restricted_field() {
    let grants = SchemaBuilder::new()
        .role("Admin")
        .role("User")
        .entity("Widget", |e| {
            e.granular(EntityAction::Update, |p| {
                p.role("Admin").role("User").field("secret", ["Admin"])
            })
        })
        .compile()
        .unwrap();

    assert_eq!(
        grants.into_vec(),
        vec![
            grant("Admin", "Widget", AclAction::UpdateAny, "*"),
            grant("User", "Widget", AclAction::UpdateAny, "*,!secret"),
        ]
    );
}

#[test]
fn granular_multiple_fields_keep_declaration_order() {
    let grants = SchemaBuilder::new()
        .role("Admin")
        .role("User")
        .entity("Widget", |e| {
            e.granular(EntityAction::Update, |p| {
                p.role("Admin")
                    .role("User")
                    .field("b", ["Admin"])
                    .field("a", ["Admin"])
            })
        })
        .compile()
        .unwrap();

    let user = grants
        .find("User", "Widget", AclAction::UpdateAny)
        .unwrap();
    assert_eq!(user.attributes, "*,!b,!a");
}

#[test]
fn granular_role_allowed_some_fields() {
    let grants = SchemaBuilder::new()
        .entity("Order", |e| {
            e.granular(EntityAction::View, |p| {
                p.role("Admin")
                    .role("Support")
                    .role("Customer")
                    .field("internalNotes", ["Admin", "Support"])
                    .field("cost", ["Admin"])
                    .field("address", ["Support", "Customer"])
            })
        })
        .compile()
        .unwrap();

    let attrs: Vec<&str> = grants.iter().map(|g| g.attributes.as_str()).collect();
    assert_eq!(
        attrs,
        ["*,!address", "*,!cost", "*,!internalNotes,!cost"]
    );
}

#[test]
fn granular_role_missing_from_full_role_list_still_granted() {
    // Role existence is not validated.
    let grants = SchemaBuilder::new()
        .role("Admin")
        .entity("Widget", |e| e.granular(EntityAction::Search, |p| p.role("Ghost")))
        .compile()
        .unwrap();
    assert_eq!(
        grants.into_vec(),
        vec![grant("Ghost", "Widget", AclAction::ReadAny, "*")]
    );
}

#[test]
fn granular_field_with_empty_roles_restricts_nobody() {
    let grants = SchemaBuilder::new()
        .entity("Widget", |e| {
            e.granular(EntityAction::Update, |p| {
                p.role("User").field("notes", Vec::<String>::new())
            })
        })
        .compile()
        .unwrap();
    assert_eq!(grants[0].attributes, "*");
}

#[test]
fn granular_duplicate_role_emits_duplicate_grants() {
    let grants = SchemaBuilder::new()
        .entity("Widget", |e| {
            e.granular(EntityAction::Create, |p| p.role("User").role("User"))
        })
        .compile()
        .unwrap();
    assert_eq!(grants.len(), 2);
    assert_eq!(grants[0], grants[1]);
}

#[test]
fn granular_empty_roles_fails() {
    let permission = Permission::granular(
        EntityAction::Update,
        Vec::new(),
        vec![PermissionField::new("secret", ["Admin"])],
    );
    let entities = [Entity::new("Widget", vec![permission])];
    let err = grantc::compile(&entities, &[Role::new("Admin")]).unwrap_err();
    assert_eq!(
        err,
        CompileError::MissingGranularRoles {
            entity: "Widget".into(),
            action: EntityAction::Update,
        }
    );
}

#[test]
fn action_mapping_is_total() {
    let expected = [
        (EntityAction::Create, "create:any"),
        (EntityAction::Delete, "delete:any"),
        (EntityAction::Search, "read:any"),
        (EntityAction::Update, "update:any"),
        (EntityAction::View, "read:own"),
    ];
    for (action, acl) in expected {
        let grants = SchemaBuilder::new()
            .role("Admin")
            .entity("Widget", |e| e.all_roles(action))
            .compile()
            .unwrap();
        assert_eq!(grants.len(), 1);
        assert_eq!(grants[0].action.as_str(), acl, "failed for {action}");

        let granular = SchemaBuilder::new()
            .entity("Widget", |e| e.granular(action, |p| p.role("Admin")))
            .compile()
            .unwrap();
        assert_eq!(granular[0].action.as_str(), acl, "failed for granular {action}");
    }
}

#[test]
fn output_order_is_entity_then_permission_then_role() {
    let grants = SchemaBuilder::new()
        .role("Admin")
        .role("User")
        .entity("B", |e| {
            e.granular(EntityAction::Update, |p| p.role("User").role("Admin"))
                .all_roles(EntityAction::Create)
        })
        .entity("A", |e| e.all_roles(EntityAction::View))
        .compile()
        .unwrap();

    let order: Vec<(&str, &str, AclAction)> = grants
        .iter()
        .map(|g| (g.resource.as_str(), g.role.as_str(), g.action))
        .collect();
    assert_eq!(
        order,
        [
            ("B", "User", AclAction::UpdateAny),
            ("B", "Admin", AclAction::UpdateAny),
            ("B", "Admin", AclAction::CreateAny),
            ("B", "User", AclAction::CreateAny),
            ("A", "Admin", AclAction::ReadOwn),
            ("A", "User", AclAction::ReadOwn),
        ]
    );
}

#[test]
fn compile_is_idempotent() {
    let schema = SchemaBuilder::new()
        .role("Admin")
        .role("User")
        .role("Guest")
        .entity("Widget", |e| {
            e.granular(EntityAction::Update, |p| {
                p.role("Admin")
                    .role("User")
                    .role("Guest")
                    .field("a", ["Admin"])
                    .field("b", ["User"])
                    .field("c", ["Admin", "User"])
                    .field("d", ["Guest"])
            })
        })
        .build();

    let first = schema.compile().unwrap();
    for _ in 0..10 {
        assert_eq!(schema.compile().unwrap(), first);
    }
    assert_eq!(
        first.to_module().unwrap().code(),
        schema.compile().unwrap().to_module().unwrap().code()
    );
}

#[test]
fn inputs_are_not_mutated() {
    let schema = SchemaBuilder::new()
        .role("Admin")
        .entity("Widget", |e| {
            e.granular(EntityAction::Update, |p| p.role("Admin").field("x", ["Admin"]))
        })
        .build();
    let before = schema.clone();
    schema.compile().unwrap();
    assert_eq!(schema, before);
}

#[test]
fn module_round_trip_through_file() {
    let grants = SchemaBuilder::new()
        .role("Admin")
        .role("User")
        .entity("Widget", |e| {
            e.granular(EntityAction::Update, |p| {
                p.role("Admin").role("User").field("secret", ["Admin"])
            })
        })
        .compile()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let module = grants.to_module().unwrap();
    let path = module.write_to(dir.path()).unwrap();
    assert!(path.ends_with("grants.json"));

    let code = std::fs::read_to_string(path).unwrap();
    let restored = GrantsModule::parse_grants(&code).unwrap();
    assert_eq!(restored, grants.into_vec());
}

#[test]
fn granular_permission_roles_are_typed() {
    let permission = Permission::granular(
        EntityAction::Create,
        vec![PermissionRole::new("Admin")],
        Vec::new(),
    );
    let grants = grantc::compile(&[Entity::new("Widget", vec![permission])], &[]).unwrap();
    assert_eq!(grants[0].role, "Admin");
}
