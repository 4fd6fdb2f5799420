use crate::batch::ModelCollection;
use crate::tidy::LongTable;

/// Quote a field when it contains the separator, a quote or a line break
fn field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn number(value: Option<f64>) -> String {
    value.filter(|v| v.is_finite()).map(|v| v.to_string()).unwrap_or_default()
}

/// Tidy observations as `year,category,value`; missing values are empty
pub fn long_to_csv(long: &LongTable) -> String {
    let mut out = String::from("year,category,value\n");
    for obs in long {
        out.push_str(&format!("{},{},{}\n", obs.year, field(&obs.category), number(obs.value)));
    }
    out
}

/// Observed and fitted values per category, for trend overlay plots
pub fn trend_to_csv(collection: &ModelCollection) -> String {
    let mut out = String::from("category,year,observed,fitted\n");
    for entry in &collection.models {
        let category = field(&entry.model.category);
        for point in &entry.model.fitted {
            out.push_str(&format!(
                "{},{},{},{}\n",
                category,
                point.year,
                number(Some(point.observed)),
                number(Some(point.fitted))
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::BatchModeler;
    use crate::tidy::Observation;

    #[test]
    fn test_long_to_csv() {
        let long = LongTable::new(vec![
            Observation { year: 2020, category: "CatA".into(), value: Some(10.0) },
            Observation { year: 2020, category: "Theft, total".into(), value: None },
        ]);

        assert_eq!(long_to_csv(&long), "year,category,value\n2020,CatA,10\n2020,\"Theft, total\",\n");
    }

    #[test]
    fn test_trend_to_csv() {
        let long = LongTable::new(
            (2019..2023)
                .map(|year| Observation { year, category: "Fraud".into(), value: Some((year % 7) as f64) })
                .collect(),
        );
        let collection = BatchModeler::default().fit_all(&long).unwrap();
        let csv = trend_to_csv(&collection);

        assert!(csv.starts_with("category,year,observed,fitted\n"));
        assert_eq!(csv.lines().count(), 5);
        assert!(csv.lines().nth(1).unwrap().starts_with("Fraud,2019,"));
    }
}
