//! profiles table queries.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use scriptguard_core::errors::StorageError;
use scriptguard_core::models::{PlanTier, Profile};

use super::{fmt_ts, parse_enum, parse_ts};
use crate::sqlite_err;

const TABLE: &str = "profiles";

struct ProfileRow {
    id: String,
    name: String,
    company_name: String,
    age: u32,
    credits: u32,
    plan: String,
    name_change_used: bool,
    theme_preference: Option<String>,
    created_at: String,
    updated_at: String,
}

impl ProfileRow {
    fn into_profile(self) -> Result<Profile, StorageError> {
        Ok(Profile {
            plan: parse_enum(TABLE, "plan", &self.plan, PlanTier::parse)?,
            created_at: parse_ts(TABLE, &self.created_at)?,
            updated_at: parse_ts(TABLE, &self.updated_at)?,
            id: self.id,
            name: self.name,
            company_name: self.company_name,
            age: self.age,
            credits: self.credits,
            name_change_used: self.name_change_used,
            theme_preference: self.theme_preference,
        })
    }
}

pub fn get_profile(conn: &Connection, user_id: &str) -> Result<Option<Profile>, StorageError> {
    let row = conn
        .prepare_cached(
            "SELECT id, name, company_name, age, credits, plan, name_change_used,
                    theme_preference, created_at, updated_at
             FROM profiles WHERE id = ?1",
        )
        .map_err(sqlite_err)?
        .query_row(params![user_id], |row| {
            Ok(ProfileRow {
                id: row.get(0)?,
                name: row.get(1)?,
                company_name: row.get(2)?,
                age: row.get(3)?,
                credits: row.get(4)?,
                plan: row.get(5)?,
                name_change_used: row.get(6)?,
                theme_preference: row.get(7)?,
                created_at: row.get(8)?,
                updated_at: row.get(9)?,
            })
        })
        .optional()
        .map_err(sqlite_err)?;
    row.map(ProfileRow::into_profile).transpose()
}

pub fn insert_profile(conn: &Connection, profile: &Profile) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO profiles
         (id, name, company_name, age, credits, plan, name_change_used,
          theme_preference, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            profile.id,
            profile.name,
            profile.company_name,
            profile.age,
            profile.credits,
            profile.plan.as_str(),
            profile.name_change_used,
            profile.theme_preference,
            fmt_ts(&profile.created_at),
            fmt_ts(&profile.updated_at),
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

/// Conditional debit in one statement: the balance check and the write
/// cannot interleave with another debit.
pub fn try_debit_credits(
    conn: &Connection,
    user_id: &str,
    amount: u32,
) -> Result<Option<u32>, StorageError> {
    conn.query_row(
        "UPDATE profiles SET credits = credits - ?2, updated_at = ?3
         WHERE id = ?1 AND credits >= ?2
         RETURNING credits",
        params![user_id, amount, fmt_ts(&Utc::now())],
        |row| row.get::<_, u32>(0),
    )
    .optional()
    .map_err(sqlite_err)
}

pub fn rename_once(conn: &Connection, user_id: &str, new_name: &str) -> Result<bool, StorageError> {
    let changed = conn
        .execute(
            "UPDATE profiles SET name = ?2, name_change_used = 1, updated_at = ?3
             WHERE id = ?1 AND name_change_used = 0",
            params![user_id, new_name, fmt_ts(&Utc::now())],
        )
        .map_err(sqlite_err)?;
    Ok(changed == 1)
}
