use std::io::{BufRead, Write};

use crate::assemble::SpectrumDataset;
use crate::error::OutputError;

/// Write one `"<MHz> <dB>"` line per bin, six decimals each, in sweep order.
pub fn write_dat<W: Write>(
    writer: &mut W,
    dataset: &SpectrumDataset,
) -> Result<(), OutputError> {
    for (freq_hz, power_db) in dataset.iter() {
        writeln!(writer, "{:.6} {:.6}", freq_hz / 1e6, power_db)?;
    }
    Ok(())
}

/// Parse a table written by [`write_dat`] back into a dataset (Hz, dB).
/// Blank lines are skipped.
pub fn read_dat<R: BufRead>(reader: R) -> Result<SpectrumDataset, OutputError> {
    let mut dataset = SpectrumDataset::default();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let mut columns = line.split_whitespace().map(str::parse::<f64>);
        match (columns.next(), columns.next(), columns.next()) {
            (Some(Ok(freq_mhz)), Some(Ok(power_db)), None) => {
                dataset.frequencies_hz.push(freq_mhz * 1e6);
                dataset.power_db.push(power_db);
            }
            _ => {
                return Err(OutputError::Parse {
                    line: index + 1,
                    content: line,
                });
            }
        }
    }
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Seek, SeekFrom};

    fn dataset() -> SpectrumDataset {
        SpectrumDataset {
            frequencies_hz: vec![1_198_720_000.0, 1_198_722_500.0, 1_201_278_750.123],
            power_db: vec![-62.5, -300.0, -41.123_456_7],
        }
    }

    #[test]
    fn test_dat_format() {
        let mut out = Vec::new();
        write_dat(&mut out, &dataset()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "1198.720000 -62.500000\n1198.722500 -300.000000\n1201.278750 -41.123457\n"
        );
    }

    #[test]
    fn test_dat_round_trip_through_file() {
        let original = dataset();
        let mut file = tempfile::tempfile().unwrap();
        write_dat(&mut file, &original).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();

        let parsed = read_dat(BufReader::new(file)).unwrap();
        assert_eq!(parsed.len(), original.len());
        for ((f0, p0), (f1, p1)) in original.iter().zip(parsed.iter()) {
            // Six decimals of MHz resolve 1 Hz
            assert!((f0 / 1e6 - f1 / 1e6).abs() <= 5e-7, "{f0} vs {f1}");
            assert!((p0 - p1).abs() <= 5e-7, "{p0} vs {p1}");
        }
    }

    #[test]
    fn test_read_skips_blank_lines() {
        let parsed = read_dat(Cursor::new("\n100.000000 -20.000000\n\n")).unwrap();
        assert_eq!(parsed.frequencies_hz, vec![100e6]);
        assert_eq!(parsed.power_db, vec![-20.0]);
    }

    #[test]
    fn test_read_rejects_malformed_lines() {
        for bad in ["100.0\n", "100.0 -20.0 3.0\n", "abc -20.0\n"] {
            match read_dat(Cursor::new(bad)) {
                Err(OutputError::Parse { line: 1, .. }) => {}
                other => panic!("expected parse error for {bad:?}, got {other:?}"),
            }
        }
    }
}
