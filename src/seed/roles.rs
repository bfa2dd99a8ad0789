use crate::seed::permissions::PERMISSIONS;

/// How a system role derives its grants from the permission catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantPolicy {
    /// The whole catalog.
    All,
    /// The catalog minus names starting with `prefixes` or equal to `exact`.
    AllExcept {
        prefixes: &'static [&'static str],
        exact: &'static [&'static str],
    },
    /// Catalog names starting with `prefixes`, equal to `exact`, or ending
    /// with `suffixes`.
    Matching {
        prefixes: &'static [&'static str],
        exact: &'static [&'static str],
        suffixes: &'static [&'static str],
    },
    /// A fixed list.
    Explicit(&'static [&'static str]),
}

impl GrantPolicy {
    fn grants(&self, name: &str) -> bool {
        match self {
            GrantPolicy::All => true,
            GrantPolicy::AllExcept { prefixes, exact } => {
                !prefixes.iter().any(|p| name.starts_with(p)) && !exact.contains(&name)
            }
            GrantPolicy::Matching {
                prefixes,
                exact,
                suffixes,
            } => {
                prefixes.iter().any(|p| name.starts_with(p))
                    || exact.contains(&name)
                    || suffixes.iter().any(|s| name.ends_with(s))
            }
            GrantPolicy::Explicit(list) => list.contains(&name),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SystemRole {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub policy: GrantPolicy,
}

/// Resolves a role's grants against the catalog, in catalog order. Explicit
/// names missing from the catalog are dropped.
pub fn resolve_grants(role: &SystemRole) -> Vec<&'static str> {
    PERMISSIONS
        .iter()
        .copied()
        .filter(|name| role.policy.grants(name))
        .collect()
}

pub fn find_role(name: &str) -> Option<&'static SystemRole> {
    SYSTEM_ROLES.iter().find(|role| role.name == name)
}

const SALES_PREFIXES: &[&str] = &[
    "crm.",
    "quotes.",
    "comercial.",
    "commercial.",
    "cadastros.customer.",
    "customer.",
    "cadastros.product.view",
    "cadastros.service.view",
    "catalog.",
    "reports.crm",
    "reports.quotes",
    "reports.customers",
];

const SALES_EXACT: &[&str] = &[
    "os.work_order.view",
    "notifications.notification.view",
    "notifications.notification.update",
    "platform.dashboard.view",
];

pub const SYSTEM_ROLES: &[SystemRole] = &[
    SystemRole {
        name: "super_admin",
        display_name: "Super Administrador",
        description: "Acesso total ao sistema, sem restrições.",
        policy: GrantPolicy::All,
    },
    SystemRole {
        name: "admin",
        display_name: "Administrador",
        description: "Gerencia tudo exceto configurações de plataforma.",
        policy: GrantPolicy::AllExcept {
            prefixes: &["platform.tenant"],
            exact: &["iam.permission.manage"],
        },
    },
    SystemRole {
        name: "gerente",
        display_name: "Gerente",
        description: "Gestão operacional e financeira completa.",
        policy: GrantPolicy::AllExcept {
            prefixes: &["platform.tenant"],
            exact: &["iam.permission.manage", "admin.settings.update"],
        },
    },
    SystemRole {
        name: "coordenador",
        display_name: "Coordenador Técnico",
        description: "Coordena equipe técnica, agenda e chamados.",
        policy: GrantPolicy::Matching {
            prefixes: &[
                "os.",
                "service_calls.",
                "chamados.",
                "technicians.",
                "equipments.",
                "cadastros.customer.view",
                "cadastros.product.view",
                "cadastros.service.view",
                "catalog.",
                "estoque.movement.view",
                "notifications.",
            ],
            exact: &["platform.dashboard.view", "hr.clock.view", "hr.schedule.view"],
            suffixes: &[],
        },
    },
    SystemRole {
        name: "tecnico",
        display_name: "Técnico",
        description: "Executa ordens de serviço e checklists em campo.",
        policy: GrantPolicy::Explicit(&[
            "os.work_order.view",
            "os.work_order.update",
            "os.work_order.change_status",
            "technicians.schedule.view",
            "technicians.time_entry.view",
            "technicians.time_entry.create",
            "technicians.checklist.view",
            "technicians.cashbox.view",
            "service_calls.service_call.view",
            "service_calls.service_call.update",
            "equipments.equipment.view",
            "equipments.equipment_model.view",
            "estoque.view",
            "estoque.movement.view",
            "estoque.transfer.accept",
            "estoque.used_stock.view",
            "estoque.used_stock.report",
            "cadastros.customer.view",
            "cadastros.product.view",
            "cadastros.service.view",
            "catalog.view",
            "notifications.notification.view",
            "notifications.notification.update",
            "hr.clock.view",
            "hr.clock.manage",
        ]),
    },
    SystemRole {
        name: "financeiro",
        display_name: "Financeiro",
        description: "Contas a pagar/receber, faturamento e conciliação.",
        policy: GrantPolicy::Matching {
            prefixes: &[
                "finance.",
                "financial.",
                "financeiro.",
                "expenses.",
                "commissions.",
                "fiscal.",
                "reports.financial",
                "reports.commission",
                "reports.margin",
                "reports.technician_cash",
            ],
            exact: &[
                "cadastros.customer.view",
                "cadastros.product.view",
                "cadastros.service.view",
                "cadastros.supplier.view",
                "quotes.quote.view",
                "os.work_order.view",
                "notifications.notification.view",
                "platform.dashboard.view",
            ],
            suffixes: &[],
        },
    },
    SystemRole {
        name: "comercial",
        display_name: "Comercial / Vendas",
        description: "Orçamentos, CRM, pipeline de vendas.",
        policy: GrantPolicy::Matching {
            prefixes: SALES_PREFIXES,
            exact: SALES_EXACT,
            suffixes: &[],
        },
    },
    SystemRole {
        name: "atendimento",
        display_name: "Atendimento",
        description: "Central de atendimento, chamados e portal do cliente.",
        policy: GrantPolicy::Matching {
            prefixes: &[
                "central.",
                "service_calls.",
                "chamados.",
                "portal.",
                "email.inbox.",
            ],
            exact: &[
                "cadastros.customer.view",
                "cadastros.customer.create",
                "os.work_order.view",
                "quotes.quote.view",
                "notifications.notification.view",
                "notifications.notification.update",
                "platform.dashboard.view",
            ],
            suffixes: &[],
        },
    },
    SystemRole {
        name: "rh",
        display_name: "Recursos Humanos",
        description: "Gestão de ponto, jornada, férias e documentos.",
        policy: GrantPolicy::Matching {
            prefixes: &["hr."],
            exact: &[
                "iam.user.view",
                "notifications.notification.view",
                "platform.dashboard.view",
            ],
            suffixes: &[],
        },
    },
    SystemRole {
        name: "estoquista",
        display_name: "Estoquista",
        description: "Movimentações de estoque, inventários e armazéns.",
        policy: GrantPolicy::Matching {
            prefixes: &["estoque.", "reports.stock"],
            exact: &[
                "cadastros.product.view",
                "cadastros.supplier.view",
                "notifications.notification.view",
                "platform.dashboard.view",
            ],
            suffixes: &[],
        },
    },
    SystemRole {
        name: "qualidade",
        display_name: "Qualidade",
        description: "Procedimentos, ações corretivas e NPS.",
        policy: GrantPolicy::Matching {
            prefixes: &[
                "quality.",
                "qualidade.",
                "customer.nps",
                "customer.satisfaction",
            ],
            exact: &[
                "os.work_order.view",
                "cadastros.customer.view",
                "equipments.equipment.view",
                "notifications.notification.view",
                "platform.dashboard.view",
            ],
            suffixes: &[],
        },
    },
    SystemRole {
        name: "visualizador",
        display_name: "Visualizador",
        description: "Acesso somente leitura a todos os módulos.",
        policy: GrantPolicy::Matching {
            prefixes: &[],
            exact: &[],
            suffixes: &[".view"],
        },
    },
    SystemRole {
        name: "monitor",
        display_name: "Monitor",
        description: "Acesso ao dashboard TV e câmeras de monitoramento.",
        policy: GrantPolicy::Matching {
            prefixes: &["tv."],
            exact: &[
                "platform.dashboard.view",
                "os.work_order.view",
                "chamados.service_call.view",
            ],
            suffixes: &[],
        },
    },
    SystemRole {
        name: "vendedor",
        display_name: "Vendedor",
        description: "Vendas, orçamentos e prospecção de clientes.",
        policy: GrantPolicy::Matching {
            prefixes: SALES_PREFIXES,
            exact: SALES_EXACT,
            suffixes: &[],
        },
    },
    SystemRole {
        name: "tecnico_vendedor",
        display_name: "Técnico-Vendedor",
        description: "Acumula funções de técnico e vendedor com acesso a valores.",
        policy: GrantPolicy::Matching {
            prefixes: &[
                "os.work_order.",
                "technicians.",
                "service_calls.",
                "equipments.equipment.view",
                "estoque.movement.view",
                "hr.clock.",
                "crm.",
                "quotes.",
                "comercial.",
                "commercial.",
                "cadastros.customer.",
                "customer.",
                "cadastros.product.",
                "cadastros.service.",
                "catalog.",
                "reports.crm",
                "reports.quotes",
                "reports.customers",
            ],
            exact: &[
                "expenses.expense.create",
                "expenses.expense.view",
                "notifications.notification.view",
                "notifications.notification.update",
                "platform.dashboard.view",
            ],
            suffixes: &[],
        },
    },
    SystemRole {
        name: "motorista",
        display_name: "Motorista",
        description: "Operação da UMC, despesas e abastecimento.",
        policy: GrantPolicy::Explicit(&[
            "os.work_order.view",
            "os.work_order.update",
            "os.work_order.change_status",
            "expenses.expense.create",
            "expenses.expense.view",
            "expenses.fueling_log.create",
            "expenses.fueling_log.view",
            "fleet.vehicle.view",
            "fleet.view",
            "technicians.cashbox.view",
            "technicians.schedule.view",
            "cadastros.customer.view",
            "notifications.notification.view",
            "notifications.notification.update",
            "hr.clock.view",
            "hr.clock.manage",
            "estoque.view",
            "estoque.transfer.create",
            "estoque.transfer.accept",
            "estoque.movement.view",
        ]),
    },
];
