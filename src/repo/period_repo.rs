use crate::db::{DbPool, ExecuteWithRetry};
use crate::models::AcademicPeriod;
use crate::schema::academic_periods;
use anyhow::Result;
use chrono::NaiveDate;
use diesel::prelude::*;
use tracing::{debug, info, instrument};

/// Inserts a fully-constructed academic period row
#[instrument(skip(pool, new_period), fields(name = %new_period.get_name()))]
pub async fn create_period(pool: &DbPool, new_period: AcademicPeriod) -> Result<AcademicPeriod> {
    debug!("Creating new academic period");

    let mut conn = pool.get()?;

    diesel::insert_into(academic_periods::table)
        .values(new_period.clone())
        .execute_with_retry(&mut conn)
        .await?;

    info!("Successfully created academic period with id: {}", new_period.get_id());

    Ok(new_period)
}

/// Retrieves one of the user's academic periods by ID
#[instrument(skip(pool), fields(period_id = %period_id))]
pub fn get_period(pool: &DbPool, user_id: &str, period_id: &str) -> Result<Option<AcademicPeriod>> {
    let conn = &mut pool.get()?;

    let result = academic_periods::table
        .filter(academic_periods::user_id.eq(user_id))
        .filter(academic_periods::id.eq(period_id))
        .first::<AcademicPeriod>(conn)
        .optional()?;

    Ok(result)
}

/// Lists the user's academic periods, earliest start first
#[instrument(skip(pool))]
pub fn list_periods(pool: &DbPool, user_id: &str) -> Result<Vec<AcademicPeriod>> {
    let conn = &mut pool.get()?;

    let result = academic_periods::table
        .filter(academic_periods::user_id.eq(user_id))
        .order(academic_periods::start_date.asc())
        .load::<AcademicPeriod>(conn)?;

    Ok(result)
}

/// Applies a partial update to one of the user's academic periods
#[instrument(skip_all, fields(period_id = %period_id))]
pub async fn update_period(
    pool: &DbPool,
    user_id: &str,
    period_id: &str,
    name: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    period_type: Option<String>,
    active: Option<bool>,
) -> Result<AcademicPeriod> {
    debug!("Updating academic period");

    let period = get_period(pool, user_id, period_id)?
        .ok_or_else(|| anyhow::anyhow!("Academic period with id {} not found", period_id))?;

    // Nothing to change; an all-None changeset is a Diesel error
    if name.is_none()
        && start_date.is_none()
        && end_date.is_none()
        && period_type.is_none()
        && active.is_none()
    {
        return Ok(period);
    }

    #[derive(AsChangeset, Clone)]
    #[diesel(table_name = academic_periods)]
    struct PeriodChangeset {
        name: Option<String>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        period_type: Option<String>,
        active: Option<bool>,
    }

    let changeset = PeriodChangeset {
        name,
        start_date,
        end_date,
        period_type,
        active,
    };

    let mut conn = pool.get()?;

    diesel::update(academic_periods::table.find(period_id.to_string()))
        .set(changeset)
        .execute_with_retry(&mut conn)
        .await?;

    drop(conn);

    get_period(pool, user_id, period_id)?
        .ok_or_else(|| anyhow::anyhow!("Academic period with id {} not found after update", period_id))
}

/// Deletes one of the user's academic periods
#[instrument(skip(pool), fields(period_id = %period_id))]
pub async fn delete_period(pool: &DbPool, user_id: &str, period_id: &str) -> Result<()> {
    info!("Deleting academic period");

    let _period = get_period(pool, user_id, period_id)?
        .ok_or_else(|| anyhow::anyhow!("Academic period with id {} not found", period_id))?;

    let mut conn = pool.get()?;

    diesel::delete(academic_periods::table.find(period_id.to_string()))
        .execute_with_retry(&mut conn)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::tests::{create_test_user, setup_test_db};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_list_ordered_by_start() {
        let pool = setup_test_db();
        let user = create_test_user(&pool, "meg").await;

        create_period(
            &pool,
            AcademicPeriod::new(
                user.get_id(),
                "Spring".to_string(),
                date(2026, 1, 12),
                date(2026, 5, 29),
                "semester".to_string(),
            ),
        )
        .await
        .unwrap();
        create_period(
            &pool,
            AcademicPeriod::new(
                user.get_id(),
                "Fall".to_string(),
                date(2025, 8, 25),
                date(2025, 12, 19),
                "semester".to_string(),
            ),
        )
        .await
        .unwrap();

        let listed = list_periods(&pool, &user.get_id()).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].get_name(), "Fall");
        assert_eq!(listed[1].get_name(), "Spring");
    }

    #[tokio::test]
    async fn test_periods_are_ownership_scoped() {
        let pool = setup_test_db();
        let owner = create_test_user(&pool, "meg").await;
        let other = create_test_user(&pool, "calvin").await;

        let period = create_period(
            &pool,
            AcademicPeriod::new(
                owner.get_id(),
                "Spring".to_string(),
                date(2026, 1, 12),
                date(2026, 5, 29),
                "semester".to_string(),
            ),
        )
        .await
        .unwrap();

        assert!(get_period(&pool, &other.get_id(), &period.get_id())
            .unwrap()
            .is_none());
    }
}
