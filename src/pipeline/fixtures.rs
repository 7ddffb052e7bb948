// Small input sets shared by the tests of the pipeline.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::pipeline::config_reader::RunSettings;
use crate::pipeline::*;

pub fn settings(root: &Path) -> RunSettings {
    RunSettings {
        input_dir: root.join("extracts"),
        boundary_file: root.join("counties.geojson"),
        out: Some(root.join("results.json").display().to_string()),
        reference: None,
        processed_date: NaiveDate::from_ymd_opt(2024, 11, 30).unwrap(),
        focus: "Clean geographic political patterns".to_string(),
        source_label: "openelections".to_string(),
        state_name: "Virginia".to_string(),
        id_property: "geoid".to_string(),
        name_property: "namelsad".to_string(),
        locality_aliases: BTreeMap::new(),
        candidate_overrides: BTreeMap::new(),
        insights: false,
    }
}

/// Four localities and two general elections, 1996 and 2020.
pub fn write_inputs(root: &Path) {
    fs::create_dir_all(root.join("extracts")).unwrap();
    fs::write(
        root.join("counties.geojson"),
        r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"geoid": "51005", "namelsad": "Alleghany County"}, "geometry": null},
            {"type": "Feature", "properties": {"geoid": "51019", "namelsad": "Bedford County"}, "geometry": null},
            {"type": "Feature", "properties": {"geoid": "51085", "namelsad": "Hanover County"}, "geometry": null},
            {"type": "Feature", "properties": {"geoid": "51760", "namelsad": "Richmond city"}, "geometry": null}
        ]}"#,
    )
    .unwrap();
    fs::write(
        root.join("extracts").join("19961105__va__general__county.csv"),
        "county,office,party,candidate,votes\n\
         Bedford City,President,Democratic,Bill Clinton,\"1,000\"\n\
         Bedford City,President,Republican,Bob Dole,\"1,500\"\n\
         Bedford County,President,Democratic,Bill Clinton,\"9,000\"\n\
         Bedford County,President,Republican,Bob Dole,\"12,000\"\n\
         Clifton Forge City,President,Democratic,Bill Clinton,800\n\
         TOTALS,President,Democratic,Bill Clinton,999999\n",
    )
    .unwrap();
    fs::write(
        root.join("extracts").join("20201103__va__general__county.csv"),
        "county,office,district,party,candidate,votes\n\
         Bedford County,President,,Democratic,Joseph R. Biden,15000\n\
         Bedford County,President,,Republican,Donald J. Trump,35000\n\
         Hanover County (CD 07),President,,Democratic,Joseph R. Biden,60000\n\
         Hanover County (CD 07),President,,Republican,Donald J. Trump,40000\n\
         Richmond City,President,,Democratic,Joseph R. Biden,510\n\
         Richmond City,President,,Republican,Donald J. Trump,490\n\
         Richmond City,President,,Libertarian,Jo Jorgensen,1000\n\
         Richmond City,US Senate,,Democratic,Mark R. Warner,700\n\
         Richmond City,House of Representatives,,Democratic,Don McEachin,700\n",
    )
    .unwrap();
}
