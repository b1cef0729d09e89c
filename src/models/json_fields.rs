use chrono::NaiveDate;
use diesel::deserialize::{FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::serialize;
use diesel::serialize::{IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::{Sqlite, SqliteValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A list of strings stored as a JSON array in a TEXT column.
///
/// Used for assignment tags and resource links.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(transparent)]
pub struct StringList(pub Vec<String>);

impl FromSql<Text, Sqlite> for StringList {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        let list = serde_json::from_str(&text)?;
        Ok(StringList(list))
    }
}

impl ToSql<Text, Sqlite> for StringList {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(serde_json::to_string(&self.0)?);
        Ok(IsNull::No)
    }
}

/// A single recorded achievement on an extracurricular activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Achievement {
    /// Short description of what was achieved
    pub title: String,

    /// The day the achievement was recorded
    pub date: NaiveDate,
}

/// A list of achievements stored as a JSON array in a TEXT column
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(transparent)]
pub struct AchievementList(pub Vec<Achievement>);

impl FromSql<Text, Sqlite> for AchievementList {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        let list = serde_json::from_str(&text)?;
        Ok(AchievementList(list))
    }
}

impl ToSql<Text, Sqlite> for AchievementList {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(serde_json::to_string(&self.0)?);
        Ok(IsNull::No)
    }
}

/// Per-criterion rubric scores for a grade, keyed by criterion name
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(transparent)]
pub struct RubricScores(pub BTreeMap<String, f64>);

impl FromSql<Text, Sqlite> for RubricScores {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        let scores = serde_json::from_str(&text)?;
        Ok(RubricScores(scores))
    }
}

impl ToSql<Text, Sqlite> for RubricScores {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(serde_json::to_string(&self.0)?);
        Ok(IsNull::No)
    }
}

/// Free-form user preferences stored as a JSON object in a TEXT column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
#[serde(transparent)]
pub struct Preferences(pub serde_json::Value);

impl FromSql<Text, Sqlite> for Preferences {
    fn from_sql(value: SqliteValue<'_, '_, '_>) -> diesel::deserialize::Result<Self> {
        let text = <String as FromSql<Text, Sqlite>>::from_sql(value)?;
        let value = serde_json::from_str(&text)?;
        Ok(Preferences(value))
    }
}

impl ToSql<Text, Sqlite> for Preferences {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(serde_json::to_string(&self.0)?);
        Ok(IsNull::No)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_achievement_list_round_trip_json() {
        let list = AchievementList(vec![Achievement {
            title: "Finished first chapter book".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 9, 12).unwrap(),
        }]);

        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(json, r#"[{"title":"Finished first chapter book","date":"2025-09-12"}]"#);

        let parsed: AchievementList = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, list);
    }

    #[test]
    fn test_string_list_serializes_as_plain_array() {
        let tags = StringList(vec!["math".to_string(), "fractions".to_string()]);
        let json = serde_json::to_string(&tags).unwrap();
        assert_eq!(json, r#"["math","fractions"]"#);
    }
}
