use std::{io::Write, ops::Range};

use csv::Writer;

use crate::{indicators::set::AnnotatedSeries, model};

/// Writes the rows in `rows` of an annotated series as CSV. Undefined
/// indicator values become empty cells.
pub fn write_csv<W: Write>(
    annotated: &AnnotatedSeries,
    rows: Range<usize>,
    out: W,
) -> model::Result<()> {
    let mut writer = Writer::from_writer(out);
    let columns = annotated.indicators.columns(&annotated.config);

    // Write header row
    let mut header: Vec<String> = ["open_time", "open", "high", "low", "close"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    header.extend(columns.iter().map(|(name, _)| name.clone()));
    header.push("in_uptrend".into());
    writer.write_record(&header)?;

    let in_uptrend = &annotated.indicators.supertrend.in_uptrend;
    for i in rows {
        let Some(candle) = annotated.series.candles.get(i) else {
            break;
        };
        let open_time = candle
            .open_time()
            .map(|t| t.format(model::OPEN_TIME_FORMAT).to_string())
            .unwrap_or_default();

        let mut record = vec![
            open_time,
            candle.open.to_string(),
            candle.high.to_string(),
            candle.low.to_string(),
            candle.close.to_string(),
        ];
        record.extend(
            columns
                .iter()
                .map(|(_, column)| column[i].map(|v| v.to_string()).unwrap_or_default()),
        );
        record.push(in_uptrend[i].map(|v| v.to_string()).unwrap_or_default());
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::set::IndicatorConfig;

    fn annotated() -> AnnotatedSeries {
        let high = [10.0, 12.0, 9.0, 14.0, 8.0];
        let low = [8.0, 9.0, 7.0, 10.0, 6.0];
        let close = [9.0, 11.0, 8.0, 13.0, 7.0];
        let candles = (0..5)
            .map(|i| model::Candle {
                open_time_ms: i as i64 * 900_000,
                open: close[i],
                high: high[i],
                low: low[i],
                close: close[i],
                fetched_at_ms: 0,
            })
            .collect();
        let config = IndicatorConfig {
            atr_window: 3,
            ..Default::default()
        };
        AnnotatedSeries::new(model::Series::new("BTCUSDT", candles), config)
    }

    #[test]
    fn writes_header_and_selected_rows() {
        let annotated = annotated();
        let mut buf = Vec::new();
        write_csv(&annotated, 2..5, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("open_time,open,high,low,close,sma_100,sma_200,"));
        assert!(lines[0].ends_with(",upperband,lowerband,in_uptrend"));
        assert!(lines[1].starts_with("1970-01-01 00:30:00,8,9,7,8,"));
        assert!(lines[3].ends_with(",22,-8,17,-8,false"));
    }

    #[test]
    fn undefined_values_are_empty_cells() {
        let annotated = annotated();
        let mut buf = Vec::new();
        write_csv(&annotated, 0..1, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let row = text.lines().nth(1).unwrap();
        let cells: Vec<&str> = row.split(',').collect();
        let supertrend = cells.len() - 5;
        assert_eq!(cells[..5], ["1970-01-01 00:00:00", "9", "10", "8", "9"]);
        assert!(cells[5..supertrend].iter().all(|c| c.is_empty()));
        // The supertrend is seeded on the first row from hl2.
        assert_eq!(cells[supertrend..], ["9", "9", "9", "9", "true"]);
    }
}
