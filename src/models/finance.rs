//! Diesel models for receivables, payables, and expenses.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::finance::{Payable as DomainPayable, Receivable as DomainReceivable};
use crate::domain::money;
use crate::domain::types::{
    CustomerId, PayableId, ReceivableId, TenantId, TypeConstraintError, WorkOrderId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::accounts_receivable)]
pub struct AccountReceivable {
    pub id: i32,
    pub tenant_id: i32,
    pub customer_id: Option<i32>,
    pub work_order_id: Option<i32>,
    pub description: String,
    pub amount_cents: i64,
    pub amount_paid_cents: i64,
    pub due_date: NaiveDate,
    pub paid_at: Option<NaiveDateTime>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::accounts_receivable)]
pub struct NewAccountReceivable<'a> {
    pub tenant_id: i32,
    pub customer_id: Option<i32>,
    pub work_order_id: Option<i32>,
    pub description: &'a str,
    pub amount_cents: i64,
    pub amount_paid_cents: i64,
    pub due_date: NaiveDate,
    pub status: &'a str,
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::accounts_payable)]
pub struct AccountPayable {
    pub id: i32,
    pub tenant_id: i32,
    pub supplier_name: Option<String>,
    pub description: String,
    pub amount_cents: i64,
    pub amount_paid_cents: i64,
    pub due_date: NaiveDate,
    pub paid_at: Option<NaiveDateTime>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub deleted_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::accounts_payable)]
pub struct NewAccountPayable<'a> {
    pub tenant_id: i32,
    pub supplier_name: Option<&'a str>,
    pub description: &'a str,
    pub amount_cents: i64,
    pub amount_paid_cents: i64,
    pub due_date: NaiveDate,
    pub status: &'a str,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::expenses)]
pub struct NewExpense<'a> {
    pub tenant_id: i32,
    pub work_order_id: Option<i32>,
    pub user_id: Option<i32>,
    pub description: &'a str,
    pub amount_cents: i64,
    pub status: &'a str,
    pub affects_net_value: bool,
    pub expense_date: Option<NaiveDate>,
}

impl TryFrom<AccountReceivable> for DomainReceivable {
    type Error = TypeConstraintError;

    fn try_from(receivable: AccountReceivable) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ReceivableId::try_from(receivable.id)?,
            tenant_id: TenantId::try_from(receivable.tenant_id)?,
            customer_id: receivable.customer_id.map(CustomerId::try_from).transpose()?,
            work_order_id: receivable.work_order_id.map(WorkOrderId::try_from).transpose()?,
            description: receivable.description,
            amount: money::from_cents(receivable.amount_cents),
            amount_paid: money::from_cents(receivable.amount_paid_cents),
            due_date: receivable.due_date,
            paid_at: receivable.paid_at,
            status: receivable.status,
        })
    }
}

impl TryFrom<AccountPayable> for DomainPayable {
    type Error = TypeConstraintError;

    fn try_from(payable: AccountPayable) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PayableId::try_from(payable.id)?,
            tenant_id: TenantId::try_from(payable.tenant_id)?,
            supplier_name: payable.supplier_name,
            description: payable.description,
            amount: money::from_cents(payable.amount_cents),
            amount_paid: money::from_cents(payable.amount_paid_cents),
            due_date: payable.due_date,
            status: payable.status,
        })
    }
}
