use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Small lifestyle dataset with the quirks of the real file: numeric columns
/// arrive as text and contain junk tokens that must coerce to missing.
pub fn lifestyle_df() -> DataFrame {
    df!(
        "City" => [
            "Helsinki", "Madrid", "Lisbon", "Oslo", "Reykjavik", "Barcelona",
            "Vienna", "Sydney", "Cairo", "Lagos", "Zurich", "Wellington",
        ],
        "Country" => [
            "Finland", "Spain", "Portugal", "Norway", "Iceland", "Spain",
            "Austria", "Australia", "Egypt", "Nigeria", "Switzerland", "New Zealand",
        ],
        "Happiness levels(Country)" => [
            "7.8", "6.4", "6.2", "7.44", "7.5", "6.4",
            "7.29", "7.22", "4.28", "-", "7.56", "7.28",
        ],
        "Sunshine hours(City)" => [
            "1858", "2769", "2806", "1668", "1326", "2591",
            "1884", "2636", "3542", "1845", "1566", "2058",
        ],
        "Obesity levels(Country)" => [
            "20.6%", "23.8", "20.8", "23.1", "21.9", "23.8",
            "20.1", "29.0", "No data", "8.9", "19.5", "30.8",
        ],
        "Life expectancy(years) (Country)" => [
            "81.9", "83.2", "81.1", "82.4", "82.7", "83.2",
            "81.5", "83.0", "71.8", "54.7", "83.6", "82.2",
        ],
        "Outdoor activities(City)" => [
            "300", "422", "365", "280", "210", "390",
            "310", "340", "190", "-", "260", "270",
        ]
    )
    .unwrap()
}

pub fn write_lifestyle_csv(path: &Path) {
    let mut df = lifestyle_df();
    let mut file = File::create(path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();
}
