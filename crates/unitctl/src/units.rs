//! Catalog of the translation units this binary knows about.

use cliunit_arris::ArrisUnit;
use cliunit_common::{DeviceId, TranslateUnit};
use cliunit_ios::IosUnit;
use cliunit_junos::JunosUnit;

/// Every unit, in lookup order.
pub fn catalog() -> Vec<Box<dyn TranslateUnit>> {
    vec![
        Box::new(IosUnit::new()),
        Box::new(JunosUnit::new()),
        Box::new(ArrisUnit::new()),
    ]
}

/// The first unit that supports `device`.
pub fn find(device: &DeviceId) -> Option<Box<dyn TranslateUnit>> {
    catalog().into_iter().find(|unit| unit.supports(device))
}
