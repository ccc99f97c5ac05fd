use crate::extract::RawSeries;
use crate::utils::round4;
use chrono::NaiveDateTime;
use log::warn;

/// GLDAS-Noah source variable names.
pub const RAINF: &str = "Rainf_tavg";
pub const TAIR: &str = "Tair_f_inst";
pub const QAIR: &str = "Qair_f_inst";
pub const WIND: &str = "Wind_f_inst";
pub const SWNET: &str = "Swnet_tavg";
pub const SWDOWN: &str = "SWdown_f_tavg";
pub const PSURF: &str = "Psurf_f_inst";

/// The default extraction list: all raw variables the canonical schema can
/// consume, including both radiation fields so the net-preferred fallback
/// has something to fall back to.
pub fn default_variables() -> Vec<String> {
    [RAINF, TAIR, QAIR, WIND, SWNET, SWDOWN, PSURF]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// The six semantic output variables of a forcing series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcingVariable {
    Precipitation,
    Temperature,
    RelativeHumidity,
    WindSpeed,
    Radiation,
    Pressure,
}

impl ForcingVariable {
    /// Substitute used when the source variables are absent from the raw
    /// tensor. Conversion never fails for missing inputs.
    pub fn default_value(self) -> f64 {
        match self {
            ForcingVariable::Precipitation => 0.0,     // mm/day
            ForcingVariable::Temperature => 15.0,      // °C
            ForcingVariable::RelativeHumidity => 0.7,  // fraction
            ForcingVariable::WindSpeed => 2.0,         // m/s
            ForcingVariable::Radiation => 0.0,         // W/m2
            ForcingVariable::Pressure => 101_325.0,    // Pa
        }
    }
}

/// One output column: semantic variable, header name, and a final scale
/// applied after the base unit conversion (this is where a pressure-unit
/// schema variant would differ; the canonical schema scales everything 1.0).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub name: String,
    pub variable: ForcingVariable,
    pub scale: f64,
}

/// Maps semantic variables to output column names and scales, resolved once
/// at construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub columns: Vec<ColumnSpec>,
}

impl Default for OutputSchema {
    /// The canonical schema: precipitation in mm/day, temperature in °C,
    /// relative humidity as a 0.1–1.0 fraction, wind in m/s, radiation in
    /// W/m2 (net shortwave preferred), pressure in Pa.
    fn default() -> Self {
        let column = |name: &str, variable| ColumnSpec {
            name: name.to_string(),
            variable,
            scale: 1.0,
        };
        Self {
            columns: vec![
                column("Precip_mm.d", ForcingVariable::Precipitation),
                column("Temp_C", ForcingVariable::Temperature),
                column("RH_1", ForcingVariable::RelativeHumidity),
                column("Wind_m.s", ForcingVariable::WindSpeed),
                column("RN_w.m2", ForcingVariable::Radiation),
                column("Pres_pa", ForcingVariable::Pressure),
            ],
        }
    }
}

impl OutputSchema {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// One point's fully converted series: rows are timesteps, columns follow
/// the output schema, every value already rounded to 4 decimals.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedSeries {
    pub point_id: String,
    pub columns: Vec<String>,
    pub times: Vec<NaiveDateTime>,
    pub rows: Vec<Vec<f64>>,
}

impl ConvertedSeries {
    /// Appends a later partition's rows; columns must match by construction
    /// (both sides come from the same schema).
    pub fn append(&mut self, mut other: ConvertedSeries) {
        self.times.append(&mut other.times);
        self.rows.append(&mut other.rows);
    }
}

/// Relative humidity (0.1–1.0) from specific humidity `q` (kg/kg), air
/// temperature `t` (K), and surface pressure `p` (Pa), via the Bolton
/// saturation-vapor-pressure approximation.
pub fn relative_humidity(q: f64, t: f64, p: f64) -> f64 {
    let rh = 0.263 * p * q / f64::exp(17.67 * (t - 273.15) / (t - 29.65)) / 100.0;
    rh.clamp(0.1, 1.0)
}

/// Converts one partition's raw tensor into per-point series in target
/// units, ordered like the tensor's point list.
///
/// Missing source variables degrade to the documented constant defaults
/// with one diagnostic per variable per call.
pub fn convert(raw: &RawSeries, schema: &OutputSchema) -> Vec<ConvertedSeries> {
    let rainf = raw.variable_index(RAINF);
    let tair = raw.variable_index(TAIR);
    let qair = raw.variable_index(QAIR);
    let wind = raw.variable_index(WIND);
    let swnet = raw.variable_index(SWNET);
    let swdown = raw.variable_index(SWDOWN);
    let psurf = raw.variable_index(PSURF);

    for column in &schema.columns {
        let available = match column.variable {
            ForcingVariable::Precipitation => rainf.is_some(),
            ForcingVariable::Temperature => tair.is_some(),
            ForcingVariable::RelativeHumidity => {
                qair.is_some() && tair.is_some() && psurf.is_some()
            }
            ForcingVariable::WindSpeed => wind.is_some(),
            ForcingVariable::Radiation => swnet.is_some() || swdown.is_some(),
            ForcingVariable::Pressure => psurf.is_some(),
        };
        if !available {
            warn!(
                "Partition {}: source data for '{}' missing, using default {}",
                raw.partition,
                column.name,
                column.variable.default_value()
            );
        }
    }

    let n_times = raw.times.len();
    let mut series = Vec::with_capacity(raw.point_ids.len());
    for (p, point_id) in raw.point_ids.iter().enumerate() {
        let at = |t: usize, v: Option<usize>| v.map(|v| raw.data[[p, t, v]]);
        let mut rows = Vec::with_capacity(n_times);
        for t in 0..n_times {
            let mut row = Vec::with_capacity(schema.columns.len());
            for column in &schema.columns {
                let value = match column.variable {
                    ForcingVariable::Precipitation => at(t, rainf).map(|flux| flux * 86_400.0),
                    ForcingVariable::Temperature => at(t, tair).map(|k| k - 273.15),
                    ForcingVariable::RelativeHumidity => {
                        match (at(t, qair), at(t, tair), at(t, psurf)) {
                            (Some(q), Some(tk), Some(pa)) => Some(relative_humidity(q, tk, pa)),
                            _ => None,
                        }
                    }
                    ForcingVariable::WindSpeed => at(t, wind),
                    ForcingVariable::Radiation => at(t, swnet).or_else(|| at(t, swdown)),
                    ForcingVariable::Pressure => at(t, psurf),
                };
                let value = value.unwrap_or_else(|| column.variable.default_value());
                row.push(round4(value * column.scale));
            }
            rows.push(row);
        }
        series.push(ConvertedSeries {
            point_id: point_id.clone(),
            columns: schema.column_names(),
            times: raw.times.clone(),
            rows,
        });
    }
    series
}
