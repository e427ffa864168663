use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::RecordSet;

/// Write `records` as CSV to `path`. Columns follow the record layout; `N/A`
/// is written for missing values.
pub fn export_csv(records: &RecordSet, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_csv(records, file)
}

/// Same as [`export_csv`] to any writer.
pub fn write_csv<W: Write>(records: &RecordSet, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for (row, record) in records.iter().enumerate() {
        writer
            .serialize(record)
            .with_context(|| format!("writing CSV row {row}"))?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::FieldValue;
    use crate::data::model::tests::blank_record;

    #[test]
    fn writes_header_and_sentinels() {
        let mut r = blank_record("R001-E1");
        r.block_group = FieldValue::Integer(130);
        r.historic_storm_max_precip_inches = FieldValue::Float(4.5);

        let mut buf = Vec::new();
        write_csv(&RecordSet::new(vec![r]), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next().unwrap(),
            "id,link,event,block_group,realization,sst_storm_center,historic_storm_date,\
             historic_storm_center,historic_storm_season,historic_storm_max_precip_inches"
        );
        assert_eq!(
            lines.next().unwrap(),
            "R001-E1,link/R001-E1,N/A,130,N/A,N/A,N/A,N/A,N/A,4.5"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storms.csv");
        let set = RecordSet::new(vec![blank_record("a"), blank_record("b")]);

        export_csv(&set, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn empty_set_writes_nothing() {
        let mut buf = Vec::new();
        write_csv(&RecordSet::default(), &mut buf).unwrap();
        assert!(buf.is_empty());
    }
}
