use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::config::Settings;
use crate::error::{Result, ScrapeError};
use crate::output::{OutputCapabilities, Payload};
use crate::scraper::ScraperBase;
use crate::session::{HttpSession, Session};

/// A single record, feature name to value. `null` marks an absent value.
pub type Row = Map<String, Value>;

static NULL: Value = Value::Null;

/// Ordered column names shared by every row of a tabular scraper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    features: Vec<String>,
}

impl FeatureSchema {
    pub fn new<I, S>(features: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = Vec::new();
        for feature in features {
            let feature = feature.into();
            if names.contains(&feature) {
                return Err(ScrapeError::DuplicateFeature(feature));
            }
            names.push(feature);
        }
        Ok(Self { features: names })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.features.iter().map(String::as_str)
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.iter().any(|f| f == feature)
    }

    /// Fails on the first key of `row` that is not a declared feature.
    pub fn check(&self, row: &Row) -> Result<()> {
        match row.keys().find(|key| !self.contains(key)) {
            Some(unknown) => Err(ScrapeError::UnknownFeature {
                feature: unknown.clone(),
                schema: self.features.join(", "),
            }),
            None => Ok(()),
        }
    }
}

/// Writes the accumulated rows of a scraper.
pub trait TabularWriter {
    fn write(&self, filename: &str) -> Result<PathBuf>;
}

/// Scraper accumulating rows that all follow a [`FeatureSchema`].
#[derive(Debug)]
pub struct TabularScraper<S = HttpSession> {
    base: ScraperBase<S>,
    schema: FeatureSchema,
    rows: Vec<Row>,
}

impl TabularScraper<HttpSession> {
    pub fn new(
        name: &str,
        base_url: &str,
        schema: FeatureSchema,
        settings: &Settings,
    ) -> Result<Self> {
        Self::with_session(name, base_url, schema, settings, HttpSession::new(settings)?)
    }
}

impl<S> TabularScraper<S>
where
    S: Session,
{
    pub fn with_session(
        name: &str,
        base_url: &str,
        schema: FeatureSchema,
        settings: &Settings,
        session: S,
    ) -> Result<Self> {
        let base = ScraperBase::with_session(
            name,
            base_url,
            settings,
            OutputCapabilities::tabular(),
            session,
        )?;
        Ok(Self {
            base,
            schema,
            rows: Vec::new(),
        })
    }

    pub fn base(&self) -> &ScraperBase<S> {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut ScraperBase<S> {
        &mut self.base
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn append_row(&mut self, row: Row) -> Result<()> {
        self.schema.check(&row)?;
        self.rows.push(row);
        Ok(())
    }

    /// Appends every row, or none of them if one is invalid.
    pub fn append_rows<I>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = Row>,
    {
        let rows = rows.into_iter().collect::<Vec<_>>();
        for row in &rows {
            self.schema.check(row)?;
        }
        self.rows.extend(rows);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn table(&self) -> Table<'_> {
        Table::new(&self.schema, &self.rows)
    }
}

impl<S> TabularWriter for TabularScraper<S>
where
    S: Session,
{
    fn write(&self, filename: &str) -> Result<PathBuf> {
        self.base.write(
            filename,
            Payload::Rows {
                schema: &self.schema,
                rows: &self.rows,
            },
        )
    }
}

/// Columnar view over accumulated rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<'a> {
    columns: Vec<Column<'a>>,
    height: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column<'a> {
    pub name: &'a str,
    pub values: Vec<&'a Value>,
}

impl<'a> Table<'a> {
    pub fn new(schema: &'a FeatureSchema, rows: &'a [Row]) -> Self {
        let columns = schema
            .iter()
            .map(|name| Column {
                name,
                values: rows
                    .iter()
                    .map(|row| row.get(name).unwrap_or(&NULL))
                    .collect(),
            })
            .collect();

        Self {
            columns,
            height: rows.len(),
        }
    }

    pub fn columns(&self) -> &[Column<'a>] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column<'a>> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    fn schema() -> FeatureSchema {
        FeatureSchema::new(["Position", "Title", "Last Week"]).unwrap()
    }

    #[test]
    fn duplicate_features_are_rejected() {
        let err = FeatureSchema::new(["Date", "Date"]).unwrap_err();
        assert!(matches!(err, ScrapeError::DuplicateFeature(f) if f == "Date"));
    }

    #[test]
    fn check_reports_unknown_key() {
        let schema = schema();
        assert!(schema.check(&row(json!({"Position": 1}))).is_ok());
        let err = schema
            .check(&row(json!({"Position": 1, "Label": "x"})))
            .unwrap_err();
        assert!(matches!(err, ScrapeError::UnknownFeature { feature, .. } if feature == "Label"));
    }

    #[test]
    fn table_fills_missing_cells_with_null() {
        let schema = schema();
        let rows = vec![
            row(json!({"Position": 1, "Title": "A", "Last Week": 3})),
            row(json!({"Position": 2, "Title": "B"})),
        ];
        let table = Table::new(&schema, &rows);
        assert_eq!(table.width(), 3);
        assert_eq!(table.height(), 2);
        let last_week = table.column("Last Week").unwrap();
        assert_eq!(last_week.values, vec![&json!(3), &Value::Null]);
        assert_eq!(
            table.columns().iter().map(|c| c.name).collect::<Vec<_>>(),
            ["Position", "Title", "Last Week"]
        );
        assert!(table.column("Artist").is_none());
    }
}
