//! Data set traversal tests

use sdmx_model::data::ALL_DIMENSIONS;
use sdmx_model::{
    DataMessage, DataSet, JsonReader, Key, Observation, ObservationOptions, SdmxError, Series,
    StructureMessage,
};
use serde_json::{Value, json};

fn series_document() -> Value {
    json!({
        "header": {
            "id": "EXR_DATA",
            "structure": {"class": "DataStructure", "id": "ECB_EXR1", "agencyID": "ECB"},
            "dimensionAtObservation": "TIME_PERIOD"
        },
        "dataSet": {
            "attributes": {"SOURCE_AGENCY": "ECB", "UNIT_MULT": "0"},
            "groups": [
                {"groupKey": {"CURRENCY": "USD"}, "attributes": {"TITLE": "US dollar", "UNIT_MULT": "1"}},
                {"groupKey": {"CURRENCY": "JPY"}, "attributes": {"TITLE": "Japanese yen"}},
                {"groupKey": {"FREQ": "M", "CURRENCY": "USD"}, "attributes": {"DECIMALS": "4"}}
            ],
            "series": [
                {
                    "seriesKey": {"FREQ": "M", "CURRENCY": "USD"},
                    "attributes": {"COLLECTION": "A", "DECIMALS": "2"},
                    "observations": [
                        {"obsKey": {"TIME_PERIOD": "2024-01"}, "obsValue": "1.0905", "attributes": {"OBS_STATUS": "A"}},
                        {"obsKey": {"TIME_PERIOD": "2024-02"}, "obsValue": "1.0795", "attributes": {"OBS_STATUS": "A"}},
                        {"obsKey": {"TIME_PERIOD": "2024-03"}, "obsValue": 1.0872}
                    ]
                },
                {
                    "seriesKey": {"FREQ": "Q", "CURRENCY": "CHF"},
                    "observations": []
                }
            ]
        }
    })
}

fn flat_document() -> Value {
    json!({
        "header": {"id": "EXR_FLAT"},
        "dataSet": {
            "dimensionAtObservation": "AllDimensions",
            "observations": [
                {"obsKey": {"FREQ": "M", "CURRENCY": "USD", "TIME_PERIOD": "2024-01"}, "obsValue": "1.0905"},
                {"obsKey": {"FREQ": "M", "CURRENCY": "JPY", "TIME_PERIOD": "2024-01"}, "obsValue": "160.01"}
            ],
            "groups": [{"groupKey": {"CURRENCY": "USD"}}]
        }
    })
}

fn periods(observations: &[Observation]) -> Vec<&str> {
    observations
        .iter()
        .map(|o| o.key.get("TIME_PERIOD").unwrap())
        .collect()
}

fn first_series<'a>(dataset: &'a DataSet<'a, JsonReader>) -> Series<'a, JsonReader> {
    dataset.series().next().unwrap().unwrap()
}

mod series_tests {
    use super::*;

    #[test]
    fn test_series_keys_in_reader_order() {
        let reader = JsonReader::new(series_document());
        let message = DataMessage::build(&reader, &reader.root()).unwrap();
        let dataset = message.require_data_set().unwrap();
        assert!(!dataset.is_flat());
        assert_eq!(dataset.dim_at_obs(), Some("TIME_PERIOD"));

        let keys: Vec<Key> = dataset
            .series()
            .map(|s| s.unwrap().key().clone())
            .collect();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].get("CURRENCY"), Some("USD"));
        assert_eq!(keys[1].get("FREQ"), Some("Q"));

        let header = message.header.as_ref().unwrap();
        assert_eq!(header.structured_by.as_ref().map(|r| r.id.as_str()), Some("ECB_EXR1"));
    }

    #[test]
    fn test_observation_iteration_is_repeatable() {
        let reader = JsonReader::new(series_document());
        let message = DataMessage::build(&reader, &reader.root()).unwrap();
        let dataset = message.require_data_set().unwrap();
        let series = first_series(dataset);
        let options = ObservationOptions::default();

        let first: Vec<Observation> = series.observations(&options).collect::<Result<_, _>>().unwrap();
        let second: Vec<Observation> = series.observations(&options).collect::<Result<_, _>>().unwrap();
        assert_eq!(first, second);
        assert_eq!(periods(&first), vec!["2024-01", "2024-02", "2024-03"]);
        assert_eq!(first[2].value.as_deref(), Some("1.0872"));
        assert_eq!(
            first[0].attributes.as_ref().and_then(|a| a.get("OBS_STATUS")),
            Some("A")
        );
    }

    #[test]
    fn test_switches_leave_fields_empty() {
        let reader = JsonReader::new(series_document());
        let message = DataMessage::build(&reader, &reader.root()).unwrap();
        let dataset = message.require_data_set().unwrap();
        let series = first_series(dataset);
        let options = ObservationOptions::builder()
            .with_values(false)
            .with_attributes(false)
            .build();

        for observation in series.observations(&options) {
            let observation = observation.unwrap();
            assert!(observation.value.is_none());
            assert!(observation.attributes.is_none());
            assert!(observation.key.get("TIME_PERIOD").is_some());
        }
    }

    #[test]
    fn test_reverse_observations() {
        let reader = JsonReader::new(series_document());
        let message = DataMessage::build(&reader, &reader.root()).unwrap();
        let dataset = message.require_data_set().unwrap();
        let series = first_series(dataset);
        let options = ObservationOptions::builder().reverse(true).build();

        let observations: Vec<Observation> =
            series.observations(&options).collect::<Result<_, _>>().unwrap();
        assert_eq!(periods(&observations), vec!["2024-03", "2024-02", "2024-01"]);
    }
}

mod group_tests {
    use super::*;

    #[test]
    fn test_group_membership() {
        let reader = JsonReader::new(series_document());
        let message = DataMessage::build(&reader, &reader.root()).unwrap();
        let dataset = message.require_data_set().unwrap();
        let groups = dataset.groups().unwrap();
        assert_eq!(groups.len(), 3);

        let usd = first_series(dataset);
        let chf = dataset.series().nth(1).unwrap().unwrap();
        assert!(groups[0].contains(&usd));
        assert!(!groups[1].contains(&usd));
        assert!(groups[2].contains(&usd));
        assert!(groups.iter().all(|g| !g.contains(&chf)));
    }

    #[test]
    fn test_group_attributes_concatenated_in_group_order() {
        let reader = JsonReader::new(series_document());
        let message = DataMessage::build(&reader, &reader.root()).unwrap();
        let dataset = message.require_data_set().unwrap();
        let usd = first_series(dataset);

        let attributes: Vec<(&str, &str)> = usd.group_attributes().unwrap().iter().collect();
        assert_eq!(
            attributes,
            vec![("TITLE", "US dollar"), ("UNIT_MULT", "1"), ("DECIMALS", "4")]
        );

        let chf = dataset.series().nth(1).unwrap().unwrap();
        assert!(chf.group_attributes().unwrap().is_empty());
        assert!(chf.attributes().is_empty());
    }

    #[test]
    fn test_effective_attributes_later_scopes_win() {
        let reader = JsonReader::new(series_document());
        let message = DataMessage::build(&reader, &reader.root()).unwrap();
        let dataset = message.require_data_set().unwrap();
        let usd = first_series(dataset);

        assert_eq!(dataset.attributes().unwrap().get("UNIT_MULT"), Some("0"));
        let effective = usd.effective_attributes().unwrap();
        assert_eq!(effective.get("SOURCE_AGENCY"), Some("ECB"));
        assert_eq!(effective.get("UNIT_MULT"), Some("1"));
        assert_eq!(effective.get("DECIMALS"), Some("2"));
        assert_eq!(effective.get("COLLECTION"), Some("A"));
        assert_eq!(effective.len(), 5);

        // scopes stay separate
        assert_eq!(usd.attributes().get("UNIT_MULT"), None);
    }
}

mod flat_tests {
    use super::*;

    #[test]
    fn test_flat_observations() {
        let reader = JsonReader::new(flat_document());
        let message = DataMessage::build(&reader, &reader.root()).unwrap();
        let dataset = message.require_data_set().unwrap();
        assert!(dataset.is_flat());
        assert_eq!(dataset.dim_at_obs(), Some(ALL_DIMENSIONS));

        let values: Vec<String> = dataset
            .observations(&ObservationOptions::default())
            .map(|o| o.unwrap().value.unwrap())
            .collect();
        assert_eq!(values, vec!["1.0905", "160.01"]);
        assert_eq!(dataset.series().count(), 0);
    }

    #[test]
    fn test_flat_data_set_rejects_groups() {
        let reader = JsonReader::new(flat_document());
        let message = DataMessage::build(&reader, &reader.root()).unwrap();
        let dataset = message.require_data_set().unwrap();
        assert!(matches!(
            dataset.groups(),
            Err(SdmxError::InvalidAssociation(_))
        ));
    }

    #[test]
    fn test_structure_and_data_messages_are_independent() {
        let reader = JsonReader::new(flat_document());
        let structure = StructureMessage::build(&reader, &reader.root()).unwrap();
        assert!(structure.dataflows.is_empty());
        assert_eq!(
            structure.header.as_ref().and_then(|h| h.id.as_deref()),
            Some("EXR_FLAT")
        );
    }
}
