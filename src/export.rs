use crate::record::Observation;
use csv::Writer;
use log::info;
use std::fs::File;
use std::io;

/// Write records as CSV, one row per observation, in the order given.
pub fn write_csv<W: io::Write>(
    records: &[&Observation],
    writer: W,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = Writer::from_writer(writer);

    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Save records to CSV file
pub fn save_to_csv(
    records: &[&Observation],
    filename: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = File::create(filename)?;
    write_csv(records, file)?;
    info!("Saved {} observations to {}", records.len(), filename);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ObservationId, Rarity};
    use crate::table::{SortColumn, SortDirection, sort};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_csv_has_every_sorted_row() {
        let records: Vec<Observation> = (0..30)
            .map(|i| Observation {
                id: ObservationId::new(i.to_string()),
                name: format!("Bird {:02}", i),
                rarity: if i % 2 == 0 { Rarity::Common } else { Rarity::ExtremelyRare },
                notes: "seen, twice".to_string(),
                timestamp: Utc.with_ymd_and_hms(2021, 5, 1, 8, 0, 0).unwrap(),
            })
            .collect();
        let ordered = sort(&records, SortColumn::Name, SortDirection::Descending);

        let mut out = Vec::new();
        write_csv(&ordered, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "id,name,rarity,notes,timestamp");
        assert_eq!(lines.len(), 31);
        assert!(lines[1].starts_with("29,Bird 29,extremely rare,\"seen, twice\","));
        assert!(lines[30].starts_with("0,Bird 00,common,"));
    }
}
