//! Demo tenants loaded by `fieldops-admin seed --demo`.

/// User created in the first tenant and attached to every other demo tenant.
pub const PLATFORM_ADMIN_EMAIL: &str = "admin@sistema.local";

pub struct DemoBranch {
    pub name: &'static str,
    pub code: &'static str,
    pub city: &'static str,
    pub state: &'static str,
}

pub struct DemoUser {
    pub name: &'static str,
    pub email: &'static str,
    pub role: &'static str,
    /// Role assigned without a tenant scope.
    pub global: bool,
}

pub struct DemoTenant {
    pub name: &'static str,
    pub document: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub branches: &'static [DemoBranch],
    pub users: &'static [DemoUser],
}

const fn user(name: &'static str, email: &'static str, role: &'static str) -> DemoUser {
    DemoUser {
        name,
        email,
        role,
        global: false,
    }
}

pub const TENANTS: &[DemoTenant] = &[
    DemoTenant {
        name: "Calibrações Brasil",
        document: "12.345.678/0001-90",
        email: "contato@calibracoes.com.br",
        phone: "(11) 3000-0001",
        branches: &[
            DemoBranch {
                name: "Matriz SP",
                code: "MTZ",
                city: "São Paulo",
                state: "SP",
            },
            DemoBranch {
                name: "Filial RJ",
                code: "FRJ",
                city: "Rio de Janeiro",
                state: "RJ",
            },
        ],
        users: &[
            DemoUser {
                name: "Administrador",
                email: PLATFORM_ADMIN_EMAIL,
                role: "super_admin",
                global: true,
            },
            user("Carlos Gerente", "carlos@calibracoes.com.br", "gerente"),
            user("Roberto Silva", "roberto@calibracoes.com.br", "tecnico"),
            user("Anderson Costa", "anderson@calibracoes.com.br", "tecnico"),
            user("Fernando Lima", "fernando@calibracoes.com.br", "tecnico"),
            user("Juliana Souza", "juliana@calibracoes.com.br", "atendimento"),
            user("Marcos Vendas", "marcos@calibracoes.com.br", "comercial"),
            user("José Motorista", "jose@calibracoes.com.br", "motorista"),
            user("Ana Financeiro", "ana@calibracoes.com.br", "financeiro"),
        ],
    },
    DemoTenant {
        name: "TechAssist Serviços",
        document: "98.765.432/0001-10",
        email: "contato@techassist.com.br",
        phone: "(21) 4000-0002",
        branches: &[DemoBranch {
            name: "Sede Central",
            code: "SED",
            city: "Campinas",
            state: "SP",
        }],
        users: &[
            user("Paulo Admin", "paulo@techassist.com.br", "admin"),
            user("Ricardo Técnico", "ricardo@techassist.com.br", "tecnico"),
            user("Luciana Atendente", "luciana@techassist.com.br", "atendimento"),
        ],
    },
    DemoTenant {
        name: "MedEquip Metrologia",
        document: "11.222.333/0001-44",
        email: "contato@medequip.com.br",
        phone: "(31) 5000-0003",
        branches: &[DemoBranch {
            name: "Laboratório BH",
            code: "LBH",
            city: "Belo Horizonte",
            state: "MG",
        }],
        users: &[
            user("Maria Admin", "maria@medequip.com.br", "admin"),
            user("Pedro Técnico", "pedro@medequip.com.br", "tecnico"),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::roles::find_role;

    #[test]
    fn every_demo_user_has_a_system_role() {
        let users: Vec<&DemoUser> = TENANTS.iter().flat_map(|t| t.users.iter()).collect();
        assert_eq!(users.len(), 14);
        for user in users {
            assert!(find_role(user.role).is_some(), "{}", user.role);
        }
    }
}
