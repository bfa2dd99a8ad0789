/// Every capability of the platform, grouped by area.
///
/// Names are unique and follow the `area.resource.action` convention; some
/// areas use two segments (`estoque.view`) or four.
pub const PERMISSIONS: &[&str] = &[
    // AI & Analytics
    "ai.analytics.view",

    // Admin / Settings
    "admin.settings.update",
    "admin.settings.view",

    // Automation
    "automation.rule.manage",
    "automation.rule.view",
    "automation.webhook.manage",
    "automation.webhook.view",

    // Auvo
    "auvo.export.execute",
    "auvo.import.delete",
    "auvo.import.execute",
    "auvo.import.view",

    // Cadastros
    "cadastros.customer.create",
    "cadastros.customer.delete",
    "cadastros.customer.update",
    "cadastros.customer.view",
    "cadastros.product.create",
    "cadastros.product.delete",
    "cadastros.product.update",
    "cadastros.product.view",
    "cadastros.service.create",
    "cadastros.service.delete",
    "cadastros.service.update",
    "cadastros.service.view",
    "cadastros.supplier.create",
    "cadastros.supplier.delete",
    "cadastros.supplier.update",
    "cadastros.supplier.view",

    // Catálogo de Serviços (público)
    "catalog.view",
    "catalog.manage",

    // Central de Atendimento
    "central.assign",
    "central.close.self",
    "central.create.task",
    "central.item.view",
    "central.manage.kpis",
    "central.manage.rules",

    // Chamados (Service Calls)
    "chamados.service_call.assign",
    "chamados.service_call.create",
    "chamados.service_call.delete",
    "chamados.service_call.update",
    "chamados.service_call.view",
    "service_calls.service_call.assign",
    "service_calls.service_call.create",
    "service_calls.service_call.delete",
    "service_calls.service_call.update",
    "service_calls.service_call.view",

    // Comercial
    "comercial.view",
    "commercial.followup.manage",
    "commercial.followup.view",
    "commercial.price_table.manage",
    "commercial.price_table.view",

    // Comissões
    "commissions.campaign.create",
    "commissions.campaign.delete",
    "commissions.campaign.update",
    "commissions.campaign.view",
    "commissions.dispute.create",
    "commissions.dispute.resolve",
    "commissions.dispute.view",
    "commissions.goal.create",
    "commissions.goal.delete",
    "commissions.goal.update",
    "commissions.goal.view",
    "commissions.recurring.create",
    "commissions.recurring.delete",
    "commissions.recurring.update",
    "commissions.recurring.view",
    "commissions.rule.create",
    "commissions.rule.delete",
    "commissions.rule.update",
    "commissions.rule.view",
    "commissions.settlement.approve",
    "commissions.settlement.create",

    // CRM
    "crm.deal.create",
    "crm.deal.delete",
    "crm.deal.update",
    "crm.deal.view",
    "crm.forecast.view",
    "crm.form.manage",
    "crm.form.view",
    "crm.goal.manage",
    "crm.goal.view",
    "crm.message.send",
    "crm.message.view",
    "crm.pipeline.create",
    "crm.pipeline.delete",
    "crm.pipeline.update",
    "crm.pipeline.view",
    "crm.proposal.manage",
    "crm.proposal.view",
    "crm.referral.manage",
    "crm.referral.view",
    "crm.renewal.manage",
    "crm.renewal.view",
    "crm.scoring.manage",
    "crm.scoring.view",
    "crm.sequence.manage",
    "crm.sequence.view",
    "crm.territory.manage",
    "crm.territory.view",
    "crm.view",

    // Customer
    "customer.document.manage",
    "customer.document.view",
    "customer.nps.view",
    "customer.satisfaction.manage",
    "customer.satisfaction.view",

    // Email
    "email.account.create",
    "email.account.delete",
    "email.account.sync",
    "email.account.update",
    "email.account.view",
    "email.inbox.create_task",
    "email.inbox.manage",
    "email.inbox.send",
    "email.inbox.view",
    "email.rule.create",
    "email.rule.delete",
    "email.rule.update",
    "email.rule.view",
    "email.signature.manage",
    "email.signature.view",
    "email.tag.manage",
    "email.tag.view",
    "email.template.create",
    "email.template.delete",
    "email.template.update",
    "email.template.view",

    // Equipamentos
    "equipamentos.equipment.view",
    "equipments.equipment.create",
    "equipments.equipment.delete",
    "equipments.equipment.update",
    "equipments.equipment.view",
    "equipments.standard_weight.create",
    "equipments.standard_weight.delete",
    "equipments.standard_weight.update",
    "equipments.standard_weight.view",
    "equipments.equipment_model.view",
    "equipments.equipment_model.create",
    "equipments.equipment_model.update",
    "equipments.equipment_model.delete",

    // Estoque
    "estoque.manage",
    "estoque.movement.create",
    "estoque.movement.view",
    "estoque.view",
    "estoque.warehouse.view",
    "estoque.warehouse.create",
    "estoque.warehouse.update",
    "estoque.warehouse.delete",
    "estoque.transfer.create",
    "estoque.transfer.accept",
    "estoque.used_stock.view",
    "estoque.used_stock.report",
    "estoque.used_stock.confirm",
    "estoque.warranty.view",
    "estoque.label.print",
    "estoque.serial.view",
    "estoque.serial.create",
    "estoque.rma.view",
    "estoque.rma.create",
    "estoque.disposal.view",
    "estoque.disposal.create",
    "estoque.intelligence.view",
    "estoque.kardex.view",
    "estoque.inventory.view",
    "estoque.inventory.create",
    "estoque.inventory.execute",

    // Despesas / Abastecimento
    "expenses.expense.approve",
    "expenses.expense.create",
    "expenses.expense.delete",
    "expenses.expense.review",
    "expenses.expense.update",
    "expenses.expense.view",
    "expenses.fueling_log.approve",
    "expenses.fueling_log.create",
    "expenses.fueling_log.delete",
    "expenses.fueling_log.update",
    "expenses.fueling_log.view",

    // Financeiro
    "finance.cashflow.view",
    "finance.chart.create",
    "finance.chart.delete",
    "finance.chart.update",
    "finance.chart.view",
    "finance.cost_center.view",
    "finance.dre.view",
    "finance.payable.create",
    "finance.payable.delete",
    "finance.payable.settle",
    "finance.payable.update",
    "finance.payable.view",
    "finance.receivable.create",
    "finance.receivable.delete",
    "finance.receivable.settle",
    "finance.receivable.update",
    "finance.receivable.view",
    "financeiro.accounts_receivable.update",
    "financeiro.approve",
    "financeiro.view",
    "financial.bank_account.create",
    "financial.bank_account.delete",
    "financial.bank_account.update",
    "financial.bank_account.view",
    "financial.fund_transfer.cancel",
    "financial.fund_transfer.create",
    "financial.fund_transfer.view",

    // Fiscal
    "fiscal.note.cancel",
    "fiscal.note.create",
    "fiscal.note.view",

    // Frota
    "fleet.fine.create",
    "fleet.fine.update",
    "fleet.fine.view",
    "fleet.inspection.create",
    "fleet.management",
    "fleet.tool_inventory.manage",
    "fleet.tool_inventory.view",
    "fleet.vehicle.create",
    "fleet.vehicle.delete",
    "fleet.vehicle.update",
    "fleet.vehicle.view",
    "fleet.view",

    // RH
    "hr.adjustment.approve",
    "hr.adjustment.create",
    "hr.adjustment.view",
    "hr.analytics.view",
    "hr.benefits.manage",
    "hr.benefits.view",
    "hr.clock.approve",
    "hr.clock.manage",
    "hr.clock.view",
    "hr.dashboard.view",
    "hr.document.manage",
    "hr.document.view",
    "hr.feedback.create",
    "hr.feedback.view",
    "hr.geofence.manage",
    "hr.geofence.view",
    "hr.holiday.manage",
    "hr.holiday.view",
    "hr.journey.manage",
    "hr.journey.view",
    "hr.leave.approve",
    "hr.leave.create",
    "hr.leave.view",
    "hr.onboarding.manage",
    "hr.onboarding.view",
    "hr.organization.manage",
    "hr.organization.view",
    "hr.performance.manage",
    "hr.performance.view",
    "hr.recruitment.manage",
    "hr.recruitment.view",
    "hr.reports.view",
    "hr.schedule.manage",
    "hr.schedule.view",
    "hr.skills.manage",
    "hr.skills.view",
    "hr.training.manage",
    "hr.training.view",

    // IAM
    "iam.audit_log.export",
    "iam.audit_log.view",
    "iam.permission.manage",
    "iam.role.create",
    "iam.role.delete",
    "iam.role.update",
    "iam.role.view",
    "iam.user.create",
    "iam.user.delete",
    "iam.user.export",
    "iam.user.update",
    "iam.user.view",

    // Importação
    "import.data.delete",
    "import.data.execute",
    "import.data.view",

    // INMETRO
    "inmetro.intelligence.convert",
    "inmetro.intelligence.enrich",
    "inmetro.intelligence.import",
    "inmetro.intelligence.view",
    "inmetro.view",

    // Notificações
    "notifications.notification.update",
    "notifications.notification.view",

    // Ordens de Serviço
    "os.work_order.authorize_dispatch",
    "os.work_order.change_status",
    "os.work_order.create",
    "os.work_order.delete",
    "os.work_order.export",
    "os.work_order.rating.view",
    "os.work_order.update",
    "os.work_order.view",

    // Platform
    "platform.branch.create",
    "platform.branch.delete",
    "platform.branch.update",
    "platform.branch.view",
    "platform.dashboard.view",
    "platform.settings.manage",
    "platform.settings.view",
    "platform.tenant.create",
    "platform.tenant.delete",
    "platform.tenant.update",
    "platform.tenant.view",

    // TV Dashboard
    "tv.dashboard.view",
    "tv.camera.manage",

    // Portal
    "portal.view",

    // Qualidade
    "qualidade.view",
    "quality.complaint.manage",
    "quality.complaint.view",
    "quality.corrective_action.manage",
    "quality.corrective_action.view",
    "quality.dashboard.view",
    "quality.procedure.manage",
    "quality.procedure.view",
    "quality.procedure.create",
    "quality.procedure.update",
    "quality.audit.view",
    "quality.audit.create",
    "quality.audit.update",
    "quality.document.view",
    "quality.document.create",
    "quality.document.approve",
    "quality.management_review.view",
    "quality.management_review.create",
    "quality.management_review.update",

    // Permissões novas
    "equipamentos.calibration.view",
    "equipamentos.calibration.create",
    "equipamentos.calibration.update",
    "equipamentos.standard_weight.view",
    "equipamentos.standard_weight.create",
    "equipamentos.standard_weight.update",
    "equipamentos.equipment.update",
    "whatsapp.config.view",
    "whatsapp.config.manage",
    "whatsapp.log.view",
    "whatsapp.send",
    "alerts.alert.view",
    "alerts.view",
    "alerts.manage",
    "alerts.configure",
    "finance.renegotiation.view",
    "financeiro.renegotiation.view",
    "financeiro.renegotiation.create",
    "financeiro.renegotiation.approve",
    "financeiro.receipt.generate",
    "financeiro.collection.manage",
    "calibration.weight_assignment.view",
    "calibration.reading.view",
    "calibration.tool.view",
    "weight.assignment.view",
    "weight.assignment.manage",
    "tool.calibration.view",
    "tool.calibration.manage",

    // Orçamentos
    "quotes.quote.apply_discount",
    "quotes.quote.approve",
    "quotes.quote.convert",
    "quotes.quote.create",
    "quotes.quote.delete",
    "quotes.quote.internal_approve",
    "quotes.quote.send",
    "quotes.quote.update",
    "quotes.quote.view",

    // Relatórios
    "reports.commission_report.export",
    "reports.commission_report.view",
    "reports.crm_report.export",
    "reports.crm_report.view",
    "reports.customers_report.export",
    "reports.customers_report.view",
    "reports.equipments_report.export",
    "reports.equipments_report.view",
    "reports.financial_report.export",
    "reports.financial_report.view",
    "reports.margin_report.export",
    "reports.margin_report.view",
    "reports.os_report.export",
    "reports.os_report.view",
    "reports.productivity_report.export",
    "reports.productivity_report.view",
    "reports.quotes_report.export",
    "reports.quotes_report.view",
    "reports.scheduled.manage",
    "reports.scheduled.view",
    "reports.service_calls_report.export",
    "reports.service_calls_report.view",
    "reports.stock_report.export",
    "reports.stock_report.view",
    "reports.suppliers_report.export",
    "reports.suppliers_report.view",
    "reports.technician_cash_report.export",
    "reports.technician_cash_report.view",

    // Rotas
    "route.plan.view",

    // Técnicos
    "technicians.cashbox.manage",
    "technicians.cashbox.view",
    "technicians.checklist.create",
    "technicians.checklist.manage",
    "technicians.checklist.view",
    "technicians.schedule.manage",
    "technicians.schedule.view",
    "technicians.time_entry.create",
    "technicians.time_entry.delete",
    "technicians.time_entry.update",
    "technicians.time_entry.view",

    // Avançado (Frontend route: /avancado)
    "advanced.follow_up.view",
];
