//! Customer repository contracts and SQLite implementation.

use crate::model::customer::{Customer, CustomerId, Membership, NewCustomer};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const CUSTOMER_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    email,
    phone,
    birth_date,
    membership
FROM customers";

/// Repository interface for customers.
pub trait CustomerRepository {
    fn create_customer(&self, customer: &NewCustomer) -> RepoResult<CustomerId>;
    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>>;
    /// Sets one customer's tier; used by list-editable saves.
    fn set_membership(&self, id: CustomerId, membership: Membership) -> RepoResult<()>;
}

/// SQLite-backed customer repository.
pub struct SqliteCustomerRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCustomerRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl CustomerRepository for SqliteCustomerRepository<'_> {
    fn create_customer(&self, customer: &NewCustomer) -> RepoResult<CustomerId> {
        customer.validate()?;
        self.conn.execute(
            "INSERT INTO customers (
                first_name,
                last_name,
                email,
                phone,
                birth_date,
                membership
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                customer.first_name.trim(),
                customer.last_name.trim(),
                customer.email.trim(),
                customer.phone.as_str(),
                customer.birth_date.as_deref(),
                customer.membership.code(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_customer(&self, id: CustomerId) -> RepoResult<Option<Customer>> {
        let customer = self
            .conn
            .query_row(&format!("{CUSTOMER_SELECT_SQL} WHERE id = ?1;"), [id], |row| {
                Ok(parse_customer_row(row, ""))
            })
            .optional()?;
        customer.transpose()
    }

    fn set_membership(&self, id: CustomerId, membership: Membership) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE customers SET membership = ?1 WHERE id = ?2;",
            params![membership.code(), id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                model: "customer",
                id,
            });
        }
        Ok(())
    }
}

/// Parses customer columns named `{prefix}id`, `{prefix}first_name`, ...
pub(crate) fn parse_customer_row(row: &Row<'_>, prefix: &str) -> RepoResult<Customer> {
    let column = |name: &str| format!("{prefix}{name}");
    let membership_code: String = row.get(column("membership").as_str())?;
    let membership = Membership::from_code(&membership_code).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid membership `{membership_code}` in customers.membership"
        ))
    })?;

    let customer = Customer {
        id: row.get(column("id").as_str())?,
        first_name: row.get(column("first_name").as_str())?,
        last_name: row.get(column("last_name").as_str())?,
        email: row.get(column("email").as_str())?,
        phone: row.get(column("phone").as_str())?,
        birth_date: row.get(column("birth_date").as_str())?,
        membership,
    };
    customer.validate()?;
    Ok(customer)
}
