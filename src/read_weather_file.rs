use crate::errors::InputError;
use csv::ReaderBuilder as CsvReaderBuilder;
use std::io::Read;

// column 0 holds a timestamp or row index and is not read
const COLUMN_AIR_TEMP: usize = 1; // outdoor air temperature in K
const COLUMN_WIND_SPEED: usize = 2; // wind speed in m/sec
const COLUMN_VAPOUR_PRESSURE: usize = 3; // vapour pressure in Pa
const COLUMN_SOLAR_IRRADIANCE: usize = 4; // global horizontal irradiance in W/m2

/// Hourly weather record, one entry per hour of the year starting at hour 0
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WeatherSeries {
    pub air_temperatures: Vec<f64>,
    pub wind_speeds: Vec<f64>,
    pub vapour_pressures: Vec<f64>,
    pub solar_irradiances: Vec<f64>,
}

impl WeatherSeries {
    pub fn len(&self) -> usize {
        self.air_temperatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.air_temperatures.is_empty()
    }
}

/// Read an hourly weather CSV. A first row whose temperature cell is not a number is taken as
/// a header row and skipped. Every other row is one hour; a row of empty cells is a missing
/// hour, not a separator.
pub fn weather_data_to_vec(file: impl Read) -> Result<WeatherSeries, InputError> {
    let mut reader = CsvReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut series = WeatherSeries::default();

    for (i, result) in reader.records().enumerate() {
        let record: csv::StringRecord = result?;
        // rows are reported 1-based, as in a spreadsheet
        let row = i + 1;
        if i == 0 && is_header(&record) {
            continue;
        }
        series
            .air_temperatures
            .push(parse_cell(&record, row, COLUMN_AIR_TEMP)?);
        series
            .wind_speeds
            .push(parse_cell(&record, row, COLUMN_WIND_SPEED)?);
        series
            .vapour_pressures
            .push(parse_cell(&record, row, COLUMN_VAPOUR_PRESSURE)?);
        series
            .solar_irradiances
            .push(parse_cell(&record, row, COLUMN_SOLAR_IRRADIANCE)?);
    }

    Ok(series)
}

fn is_header(record: &csv::StringRecord) -> bool {
    record
        .get(COLUMN_AIR_TEMP)
        .is_some_and(|cell| !cell.is_empty() && cell.parse::<f64>().is_err())
}

fn parse_cell(record: &csv::StringRecord, row: usize, column: usize) -> Result<f64, InputError> {
    let cell = match record.get(column) {
        Some(cell) if !cell.is_empty() => cell,
        _ => return Err(InputError::MissingValue { row, column }),
    };
    cell.parse().map_err(|_| InputError::NonNumeric {
        row,
        column,
        value: cell.to_string(),
    })
}
