//! Timeline grouping of the visible rows by publication year.

use std::collections::BTreeMap;

use crate::domain::Publication;

/// Records published in one year, or the undated bucket (`year == None`).
#[derive(Debug, Clone, PartialEq)]
pub struct YearBucket<'a> {
    pub year: Option<i32>,
    pub records: Vec<&'a Publication>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline<'a> {
    buckets: Vec<YearBucket<'a>>,
}

impl<'a> Timeline<'a> {
    /// Group `rows` by year. Years ascend; inside a bucket the rows keep the
    /// order they were given in. Records without a usable date go to a
    /// trailing undated bucket.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a Publication>,
    {
        let mut by_year: BTreeMap<i32, Vec<&'a Publication>> = BTreeMap::new();
        let mut undated = Vec::new();
        for record in rows {
            match record.year() {
                Some(year) => by_year.entry(year).or_default().push(record),
                None => undated.push(record),
            }
        }

        let mut buckets: Vec<YearBucket<'a>> = by_year
            .into_iter()
            .map(|(year, records)| YearBucket {
                year: Some(year),
                records,
            })
            .collect();
        if !undated.is_empty() {
            buckets.push(YearBucket {
                year: None,
                records: undated,
            });
        }
        Self { buckets }
    }

    pub fn buckets(&self) -> &[YearBucket<'a>] {
        &self.buckets
    }

    /// First and last dated year.
    pub fn span(&self) -> Option<(i32, i32)> {
        let mut years = self.buckets.iter().filter_map(|b| b.year);
        let first = years.next()?;
        Some((first, years.last().unwrap_or(first)))
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_year_with_undated_last() {
        let records = vec![
            Publication::new("B", "", "1").with_date("2019-03-01"),
            Publication::new("A", "", "2"),
            Publication::new("C", "", "3").with_date("2015"),
            Publication::new("D", "", "4").with_date("2019 Jan"),
            Publication::new("E", "", "5").with_date("someday"),
        ];
        let timeline = Timeline::from_rows(&records);

        let shape: Vec<(Option<i32>, Vec<&str>)> = timeline
            .buckets()
            .iter()
            .map(|b| (b.year, b.records.iter().map(|p| p.title.as_str()).collect()))
            .collect();
        assert_eq!(
            shape,
            vec![
                (Some(2015), vec!["C"]),
                (Some(2019), vec!["B", "D"]),
                (None, vec!["A", "E"]),
            ]
        );
        assert_eq!(timeline.span(), Some((2015, 2019)));
        assert_eq!(timeline.len(), 5);
    }

    #[test]
    fn undated_only_has_no_span() {
        let records = vec![Publication::new("A", "", "1")];
        let timeline = Timeline::from_rows(&records);
        assert_eq!(timeline.span(), None);
        assert_eq!(timeline.buckets().len(), 1);
        assert!(Timeline::from_rows(Vec::new()).is_empty());
    }
}
