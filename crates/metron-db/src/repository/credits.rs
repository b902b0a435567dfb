//! Credit repository: creators and their roles on an issue.

use metron_common::credits::PlannedCredit;
use metron_common::models::{Credit, CreditRead, NamedRef};
use sqlx::{PgConnection, PgPool};

#[derive(sqlx::FromRow)]
struct CreditRoleRow {
    id: i64,
    creator_id: i64,
    creator_name: String,
    role_id: Option<i64>,
    role_name: Option<String>,
}

/// Credits of an issue, sorted by creator name with roles in display order.
pub async fn for_issue(pool: &PgPool, issue_id: i64) -> Result<Vec<CreditRead>, sqlx::Error> {
    let rows = sqlx::query_as::<_, CreditRoleRow>(
        r#"
        SELECT c.id, cr.id AS creator_id, cr.name AS creator_name,
               r.id AS role_id, r.name AS role_name
        FROM credits c
        JOIN creators cr ON cr.id = c.creator_id
        LEFT JOIN credit_roles cro ON cro.credit_id = c.id
        LEFT JOIN roles r ON r.id = cro.role_id
        WHERE c.issue_id = $1
        ORDER BY cr.name, c.id, r."order"
        "#,
    )
    .bind(issue_id)
    .fetch_all(pool)
    .await?;

    let mut credits: Vec<CreditRead> = Vec::new();
    for row in rows {
        let role = row
            .role_id
            .zip(row.role_name)
            .map(|(id, name)| NamedRef { id, name });
        match credits.last_mut() {
            Some(last) if last.id == row.id => last.role.extend(role),
            _ => credits.push(CreditRead {
                id: row.id,
                creator: NamedRef {
                    id: row.creator_id,
                    name: row.creator_name,
                },
                role: role.into_iter().collect(),
            }),
        }
    }
    Ok(credits)
}

pub async fn count_for_issue(pool: &PgPool, issue_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM credits WHERE issue_id = $1")
        .bind(issue_id)
        .fetch_one(pool)
        .await
}

/// Insert a credit and its roles.
pub async fn insert(
    conn: &mut PgConnection,
    issue_id: i64,
    creator_id: i64,
    role_ids: &[i64],
) -> Result<Credit, sqlx::Error> {
    let credit = sqlx::query_as::<_, Credit>(
        r#"
        INSERT INTO credits (issue_id, creator_id)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(issue_id)
    .bind(creator_id)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query(
        "INSERT INTO credit_roles (credit_id, role_id) \
         SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING",
    )
    .bind(credit.id)
    .bind(role_ids)
    .execute(&mut *conn)
    .await?;

    Ok(credit)
}

/// Create several credits at once; all or nothing.
pub async fn create_many(
    pool: &PgPool,
    credits: &[(i64, i64, Vec<i64>)],
) -> Result<Vec<Credit>, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let mut created = Vec::with_capacity(credits.len());
    for (issue_id, creator_id, role_ids) in credits {
        created.push(insert(&mut tx, *issue_id, *creator_id, role_ids).await?);
    }
    tx.commit().await?;
    Ok(created)
}

/// Copy planned credits onto `issue_id` and record who did it.
pub async fn apply_duplicate(
    pool: &PgPool,
    issue_id: i64,
    planned: &[PlannedCredit],
    user_id: i64,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for credit in planned {
        insert(&mut tx, issue_id, credit.creator_id, &credit.role_ids).await?;
    }
    super::touch(&mut tx, "issues", issue_id, user_id).await?;
    tx.commit().await?;
    Ok(())
}
