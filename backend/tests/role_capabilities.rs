//! The full role/capability membership table.

use centinela_backend::models::user::{Capability, Role};

#[test]
fn nine_roles_exist_with_stable_wire_names() {
    let names: Vec<&str> = Role::ALL.iter().map(|r| r.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "admin",
            "supervisor",
            "agente",
            "jefe",
            "gerente",
            "coordinador",
            "asistente",
            "centro_de_control",
            "oficina",
        ]
    );
}

#[test]
fn capability_table_matches_the_membership_lists() {
    let history_and_map = [
        Role::Admin,
        Role::Asistente,
        Role::Jefe,
        Role::Gerente,
        Role::CentroDeControl,
    ];

    for role in Role::ALL {
        let in_list = history_and_map.contains(&role);
        assert_eq!(
            role.has_capability(Capability::ViewHistory),
            in_list,
            "history: {:?}",
            role
        );
        assert_eq!(
            role.has_capability(Capability::ViewMap),
            in_list,
            "map: {:?}",
            role
        );
        assert_eq!(
            role.has_capability(Capability::Administer),
            role == Role::Admin,
            "administer: {:?}",
            role
        );
    }
}

#[test]
fn field_roles_hold_no_capabilities_at_all() {
    for role in [Role::Supervisor, Role::Agente, Role::Coordinador, Role::Oficina] {
        for capability in [
            Capability::ViewHistory,
            Capability::ViewMap,
            Capability::Administer,
        ] {
            assert!(!role.has_capability(capability), "{:?} {:?}", role, capability);
        }
    }
}
