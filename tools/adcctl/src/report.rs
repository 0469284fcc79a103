//! Output formatting for device listings and samples

use hal::AdcInfo;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    pub id: usize,
    #[serde(flatten)]
    pub info: AdcInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct SampleReport {
    pub id: usize,
    pub index: usize,
    pub raw: u16,
    pub volts: f32,
}

impl SampleReport {
    pub fn new(id: usize, index: usize, raw: u16, info: &AdcInfo) -> Self {
        Self {
            id,
            index,
            raw,
            volts: info.to_volts(raw),
        }
    }
}

pub struct Formatter {
    json: bool,
    volts: bool,
}

impl Formatter {
    pub fn new(json: bool, volts: bool) -> Self {
        Self { json, volts }
    }

    pub fn device(&self, report: &DeviceReport) -> String {
        if self.json {
            return to_json(report);
        }
        format!(
            "adc{:<3} max_raw={:<6} ref={:.3} V",
            report.id, report.info.max_raw_value, report.info.ref_voltage
        )
    }

    pub fn sample(&self, report: &SampleReport) -> String {
        if self.json {
            return to_json(report);
        }
        if self.volts {
            format!("adc{} #{}: {:.4} V", report.id, report.index, report.volts)
        } else {
            format!("adc{} #{}: {}", report.id, report.index, report.raw)
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| format!("{{\"error\":\"{err}\"}}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INFO: AdcInfo = AdcInfo {
        max_raw_value: 4095,
        ref_voltage: 3.3,
    };

    #[test]
    fn device_as_text() {
        let report = DeviceReport { id: 2, info: INFO };
        assert_eq!(
            Formatter::new(false, false).device(&report),
            "adc2   max_raw=4095   ref=3.300 V"
        );
    }

    #[test]
    fn device_as_json() {
        let report = DeviceReport { id: 0, info: INFO };
        let json: serde_json::Value =
            serde_json::from_str(&Formatter::new(true, false).device(&report)).unwrap();
        assert_eq!(json["id"], 0);
        assert_eq!(json["max_raw_value"], 4095);
    }

    #[test]
    fn sample_as_raw_or_volts() {
        let report = SampleReport::new(1, 7, 4095, &INFO);
        assert_eq!(Formatter::new(false, false).sample(&report), "adc1 #7: 4095");
        assert_eq!(
            Formatter::new(false, true).sample(&report),
            "adc1 #7: 3.3000 V"
        );
    }

    #[test]
    fn sample_as_json() {
        let report = SampleReport::new(3, 0, 0, &INFO);
        let json: serde_json::Value =
            serde_json::from_str(&Formatter::new(true, true).sample(&report)).unwrap();
        assert_eq!(json["raw"], 0);
        assert_eq!(json["volts"], 0.0);
    }
}
