use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::{Error, database_id::DatabaseId, db::is_unique_violation};

pub type CategoryId = DatabaseId;

/// A label for income or expenses, e.g. "Salary" or "Groceries".
///
/// The same name may be used once for income and once for expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    /// The ID of the category in the database.
    pub id: CategoryId,
    /// The display name, unique ignoring case among categories of the same kind.
    pub name: String,
    /// Whether the category is for income (`true`) or expenses (`false`).
    pub is_income: bool,
}

/// Whether a category is income or expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    /// Parse the kind from a path segment, ignoring case.
    ///
    /// # Errors
    /// Returns [Error::InvalidCategoryKind] for anything other than "income" or "expense".
    pub fn parse(raw_kind: &str) -> Result<Self, Error> {
        match raw_kind.to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(Error::InvalidCategoryKind(raw_kind.to_owned())),
        }
    }

    fn is_income(self) -> bool {
        self == Self::Income
    }
}

/// The changes to make to a category. Missing fields are left as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub is_income: Option<bool>,
}

impl CategoryChanges {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.is_income.is_none()
    }
}

/// Whether any transactions or budgets still refer to a category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryUsage {
    pub id: CategoryId,
    pub in_use: bool,
    pub transaction_count: i64,
    pub budget_count: i64,
}

/// How many categories there are of each kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryStatistics {
    /// The number of categories of either kind.
    pub total: i64,
    /// The number of income categories.
    pub income_count: i64,
    /// The number of expense categories.
    pub expense_count: i64,
}

pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL COLLATE NOCASE,
            is_income BOOLEAN NOT NULL,
            UNIQUE(name, is_income)
        )",
        (),
    )?;

    Ok(())
}

pub fn map_row_to_category(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        is_income: row.get(2)?,
    })
}

/// Get a category by its ID.
///
/// # Errors
/// Returns [Error::CategoryNotFound] if there is no such category.
pub fn get_category(id: CategoryId, connection: &Connection) -> Result<Category, Error> {
    connection
        .query_row(
            "SELECT id, name, is_income FROM category WHERE id = ?1",
            [id],
            map_row_to_category,
        )
        .optional()?
        .ok_or(Error::CategoryNotFound)
}

pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, is_income FROM category ORDER BY name, is_income")?
        .query_map([], map_row_to_category)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Get the income or the expense categories, ordered by name.
pub fn get_categories_by_kind(
    kind: CategoryKind,
    connection: &Connection,
) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, is_income FROM category WHERE is_income = ?1 ORDER BY name")?
        .query_map([kind.is_income()], map_row_to_category)?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

pub fn get_category_statistics(connection: &Connection) -> Result<CategoryStatistics, Error> {
    connection
        .query_row(
            "SELECT COUNT(*),
                COALESCE(SUM(CASE WHEN is_income THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN is_income THEN 0 ELSE 1 END), 0)
            FROM category",
            [],
            |row| {
                Ok(CategoryStatistics {
                    total: row.get(0)?,
                    income_count: row.get(1)?,
                    expense_count: row.get(2)?,
                })
            },
        )
        .map_err(Error::from)
}

/// Create a category.
///
/// # Errors
/// Returns [Error::DuplicateCategory] if a category with the same name and flag exists.
pub fn create_category(
    name: &str,
    is_income: bool,
    connection: &Connection,
) -> Result<Category, Error> {
    connection
        .execute(
            "INSERT INTO category (name, is_income) VALUES (?1, ?2)",
            (name, is_income),
        )
        .map_err(|error| match error {
            error if is_unique_violation(&error) => Error::DuplicateCategory(name.to_owned()),
            error => error.into(),
        })?;

    Ok(Category {
        id: connection.last_insert_rowid(),
        name: name.to_owned(),
        is_income,
    })
}

/// Change the name and/or income flag of a category.
///
/// # Errors
/// Returns [Error::NoFieldsToUpdate] if `changes` is empty, [Error::UpdateMissingCategory] if
/// the category does not exist, or [Error::DuplicateCategory] if the change would clash with
/// another category.
pub fn update_category(
    id: CategoryId,
    changes: CategoryChanges,
    connection: &Connection,
) -> Result<Category, Error> {
    if changes.is_empty() {
        return Err(Error::NoFieldsToUpdate);
    }

    let rows_affected = connection
        .execute(
            "UPDATE category
            SET name = COALESCE(?1, name), is_income = COALESCE(?2, is_income)
            WHERE id = ?3",
            (&changes.name, changes.is_income, id),
        )
        .map_err(|error| match error {
            error if is_unique_violation(&error) => {
                Error::DuplicateCategory(changes.name.clone().unwrap_or_default())
            }
            error => error.into(),
        })?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingCategory);
    }

    get_category(id, connection)
}

pub fn get_category_usage(id: CategoryId, connection: &Connection) -> Result<CategoryUsage, Error> {
    get_category(id, connection)?;

    let (transaction_count, budget_count): (i64, i64) = connection.query_row(
        "SELECT
            (SELECT COUNT(*) FROM \"transaction\" WHERE category_id = ?1),
            (SELECT COUNT(*) FROM budget WHERE category_id = ?1)",
        [id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(CategoryUsage {
        id,
        in_use: transaction_count > 0 || budget_count > 0,
        transaction_count,
        budget_count,
    })
}

/// Delete a category that no transactions or budgets refer to.
///
/// # Errors
/// Returns [Error::CategoryInUse] if the category is referenced, or
/// [Error::DeleteMissingCategory] if it does not exist.
pub fn delete_category(id: CategoryId, connection: &Connection) -> Result<(), Error> {
    let usage = match get_category_usage(id, connection) {
        Ok(usage) => usage,
        Err(Error::CategoryNotFound) => return Err(Error::DeleteMissingCategory),
        Err(error) => return Err(error),
    };

    if usage.in_use {
        return Err(Error::CategoryInUse);
    }

    let rows_affected = connection.execute("DELETE FROM category WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}
