use crate::core::distance::{geodesic_miles, DistanceFn};
use crate::models::{BuildOutcome, Coordinates, Diagnostic, Location, LocationOrigin, Parameters};
use crate::services::AddressResolver;

/// Miles added on top of an out-of-range city when suggesting a new max
const SUGGESTED_MAX_DISTANCE_MARGIN: f64 = 10.0;

/// A `label,address` pair parsed from the custom locations text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomLocationLine {
    pub line_number: usize,
    pub label: String,
    pub address: String,
}

/// Split custom location text into label/address pairs
///
/// The label is everything before the first comma; the address is the
/// remainder, commas included. Blank lines are ignored. Lines without a
/// comma come back as `Err` with their 1-based line number.
pub fn parse_custom_locations(raw: &str) -> Vec<Result<CustomLocationLine, Diagnostic>> {
    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| match line.split_once(',') {
            Some((label, address)) => Ok(CustomLocationLine {
                line_number: idx + 1,
                label: label.trim().to_string(),
                address: address.trim().to_string(),
            }),
            None => Err(Diagnostic::MalformedCustomLocationLine {
                line_number: idx + 1,
                line: line.trim().to_string(),
            }),
        })
        .collect()
}

/// Assembles the working set of candidate locations for one run
///
/// # Pipeline Stages
/// 1. Distance from home for every base row, dropping rows without coordinates
/// 2. Max distance filter
/// 3. Exact-name removal
/// 4. Explicit addition (never blocked by the distance filter)
/// 5. Custom labeled locations, prepended
/// 6. Synthetic remote row, prepended
///
/// Later stages may reintroduce a row an earlier stage removed; rows are
/// never deduplicated.
#[derive(Debug, Clone, Copy)]
pub struct LocationSetBuilder {
    distance: DistanceFn,
}

impl LocationSetBuilder {
    pub fn new() -> Self {
        Self {
            distance: geodesic_miles,
        }
    }

    pub fn with_distance(distance: DistanceFn) -> Self {
        Self { distance }
    }

    pub fn build(
        &self,
        base: &[Location],
        params: &Parameters,
        home: Coordinates,
        resolver: &mut AddressResolver<'_>,
    ) -> BuildOutcome {
        let mut diagnostics = Vec::new();

        // Stages 1 & 2: distance + max distance filter
        let mut rows: Vec<Location> = base
            .iter()
            .filter_map(|row| {
                let coords = row.coordinates.filter(Coordinates::is_valid)?;
                Some(Location {
                    distance_miles: (self.distance)(home, coords),
                    ..row.clone()
                })
            })
            .filter(|row| row.distance_miles <= params.max_distance_miles)
            .collect();

        tracing::debug!(
            "{} of {} base rows within {} miles",
            rows.len(),
            base.len(),
            params.max_distance_miles
        );

        // Stage 3: removal
        if let Some(name) = params.remove_city() {
            let before = rows.len();
            rows.retain(|row| row.name != name);
            tracing::debug!("Removed {} rows named '{}'", before - rows.len(), name);
        }

        // Stage 4: explicit addition
        if let Some(address) = params.add_city() {
            match self.resolve_row(address, address, LocationOrigin::Added, params, home, resolver) {
                Some(row) => {
                    if row.distance_miles > params.max_distance_miles {
                        let warning = Diagnostic::OutOfRangeWarning {
                            address: address.to_string(),
                            distance_miles: row.distance_miles,
                            max_distance_miles: params.max_distance_miles,
                            suggested_max_distance_miles: row.distance_miles.floor()
                                + SUGGESTED_MAX_DISTANCE_MARGIN,
                        };
                        tracing::warn!("{}", warning);
                        diagnostics.push(warning);
                    }
                    rows.push(row);
                }
                None => diagnostics.push(skipped(address, address)),
            }
        }

        // Stage 5: custom labeled locations
        let mut custom_rows = Vec::new();
        if let Some(raw) = params.custom_locations() {
            for entry in parse_custom_locations(raw) {
                let line = match entry {
                    Ok(line) => line,
                    Err(diagnostic) => {
                        tracing::warn!("{}", diagnostic);
                        diagnostics.push(diagnostic);
                        continue;
                    }
                };

                if line.address.is_empty() {
                    diagnostics.push(skipped(&line.label, &line.address));
                    continue;
                }

                match self.resolve_row(&line.label, &line.address, LocationOrigin::Custom, params, home, resolver) {
                    Some(row) => custom_rows.push(row),
                    None => diagnostics.push(skipped(&line.label, &line.address)),
                }
            }
        }

        // Stage 6: remote row, then custom rows, then the rest
        let mut locations = Vec::with_capacity(1 + custom_rows.len() + rows.len());
        locations.push(Location::remote(home, params.annual_salary));
        locations.extend(custom_rows);
        locations.extend(rows);

        BuildOutcome {
            locations,
            diagnostics,
        }
    }

    fn resolve_row(
        &self,
        name: &str,
        address: &str,
        origin: LocationOrigin,
        params: &Parameters,
        home: Coordinates,
        resolver: &mut AddressResolver<'_>,
    ) -> Option<Location> {
        let coords = resolver.resolve(address)?;
        let distance = (self.distance)(home, coords);
        Some(Location::resolved(name, coords, distance, params.annual_salary, origin))
    }
}

impl Default for LocationSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn skipped(label: &str, address: &str) -> Diagnostic {
    let diagnostic = Diagnostic::AddressSkipped {
        label: label.to_string(),
        address: address.to_string(),
    };
    tracing::warn!("{}", diagnostic);
    diagnostic
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{RetryPolicy, StaticGeocoder};

    const HOME: Coordinates = Coordinates { latitude: 38.8977, longitude: -77.0365 };

    fn base_rows() -> Vec<Location> {
        vec![
            Location::from_dataset("Washington, DC", Some(Coordinates::new(38.9072, -77.0369)), None),
            Location::from_dataset("Baltimore, MD", Some(Coordinates::new(39.2904, -76.6122)), None),
            Location::from_dataset("Richmond, VA", Some(Coordinates::new(37.5407, -77.4360)), None),
            Location::from_dataset("Philadelphia, PA", Some(Coordinates::new(39.9526, -75.1652)), None),
            Location::from_dataset("Nowhere", None, None),
        ]
    }

    fn geocoder() -> StaticGeocoder {
        StaticGeocoder::new()
            .with_place("Baltimore, MD", Coordinates::new(39.2904, -76.6122))
            .with_place("Pittsburgh, PA", Coordinates::new(40.4406, -79.9959))
            .with_place("123 Main St, Annapolis, MD", Coordinates::new(38.9784, -76.4922))
    }

    fn build(params: &Parameters, geocoder: &StaticGeocoder) -> BuildOutcome {
        let mut resolver = AddressResolver::new(geocoder, RetryPolicy::immediate(3));
        LocationSetBuilder::new().build(&base_rows(), params, HOME, &mut resolver)
    }

    fn names(outcome: &BuildOutcome) -> Vec<&str> {
        outcome.locations.iter().map(|l| l.name.as_str()).collect()
    }

    #[test]
    fn test_parse_custom_locations() {
        let parsed = parse_custom_locations("My Job, 123 Main St, Annapolis, MD\n\nno separator here\n");

        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed[0],
            Ok(CustomLocationLine {
                line_number: 1,
                label: "My Job".to_string(),
                address: "123 Main St, Annapolis, MD".to_string(),
            })
        );
        assert_eq!(
            parsed[1],
            Err(Diagnostic::MalformedCustomLocationLine {
                line_number: 3,
                line: "no separator here".to_string(),
            })
        );
    }

    #[test]
    fn test_remote_first_and_null_coordinates_dropped() {
        let params = Parameters::default();
        let outcome = build(&params, &geocoder());

        assert_eq!(
            names(&outcome),
            vec!["Remote", "Washington, DC", "Baltimore, MD", "Richmond, VA", "Philadelphia, PA"]
        );
        assert!(outcome.locations[0].is_remote);
        assert_eq!(outcome.locations[0].distance_miles, 0.0);
        assert!(outcome.locations.iter().all(|l| l.coordinates.is_some()));
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_max_distance_filter() {
        let params = Parameters {
            max_distance_miles: 50.0,
            ..Parameters::default()
        };
        let outcome = build(&params, &geocoder());

        assert_eq!(names(&outcome), vec!["Remote", "Washington, DC", "Baltimore, MD"]);
        assert!(outcome.locations.iter().all(|l| l.distance_miles <= 50.0));
    }

    #[test]
    fn test_remove_is_case_sensitive() {
        let params = Parameters {
            remove_city_name: Some("baltimore, md".to_string()),
            ..Parameters::default()
        };
        assert!(names(&build(&params, &geocoder())).contains(&"Baltimore, MD"));

        let params = Parameters {
            remove_city_name: Some("Baltimore, MD".to_string()),
            ..Parameters::default()
        };
        assert!(!names(&build(&params, &geocoder())).contains(&"Baltimore, MD"));
    }

    #[test]
    fn test_remove_then_add_reintroduces_city() {
        let params = Parameters {
            remove_city_name: Some("Baltimore, MD".to_string()),
            add_city_address: Some("Baltimore, MD".to_string()),
            ..Parameters::default()
        };
        let outcome = build(&params, &geocoder());

        let baltimore: Vec<&Location> = outcome
            .locations
            .iter()
            .filter(|l| l.name == "Baltimore, MD")
            .collect();
        assert_eq!(baltimore.len(), 1);
        assert_eq!(baltimore[0].origin, LocationOrigin::Added);
        assert_eq!(outcome.locations.last().unwrap().name, "Baltimore, MD");
    }

    #[test]
    fn test_add_without_remove_duplicates() {
        let params = Parameters {
            add_city_address: Some("Baltimore, MD".to_string()),
            ..Parameters::default()
        };
        let outcome = build(&params, &geocoder());

        let count = outcome.locations.iter().filter(|l| l.name == "Baltimore, MD").count();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_out_of_range_add_warns_but_adds() {
        let params = Parameters {
            max_distance_miles: 100.0,
            add_city_address: Some("Pittsburgh, PA".to_string()),
            ..Parameters::default()
        };
        let outcome = build(&params, &geocoder());

        let added = outcome.locations.last().unwrap();
        assert_eq!(added.name, "Pittsburgh, PA");
        assert!(added.distance_miles > 100.0);
        assert_eq!(added.baseline_salary_hint, Some(params.annual_salary));

        match &outcome.diagnostics[..] {
            [Diagnostic::OutOfRangeWarning { distance_miles, suggested_max_distance_miles, .. }] => {
                assert_eq!(*suggested_max_distance_miles, distance_miles.floor() + 10.0);
            }
            other => panic!("expected one out-of-range warning, got {:?}", other),
        }
    }

    #[test]
    fn test_unresolvable_add_is_skipped() {
        let params = Parameters {
            add_city_address: Some("Atlantis".to_string()),
            ..Parameters::default()
        };
        let outcome = build(&params, &geocoder());

        assert!(!names(&outcome).contains(&"Atlantis"));
        assert!(matches!(
            &outcome.diagnostics[..],
            [Diagnostic::AddressSkipped { address, .. }] if address == "Atlantis"
        ));
    }

    #[test]
    fn test_custom_locations_prepended_after_remote() {
        let params = Parameters {
            custom_locations_raw: Some(
                "My Job,123 Main St, Annapolis, MD\nGym,Atlantis\nbroken line".to_string(),
            ),
            ..Parameters::default()
        };
        let outcome = build(&params, &geocoder());

        assert_eq!(outcome.locations[0].name, "Remote");
        assert_eq!(outcome.locations[1].name, "My Job");
        assert_eq!(outcome.locations[1].origin, LocationOrigin::Custom);
        assert_eq!(outcome.locations[2].name, "Washington, DC");
        assert!(!names(&outcome).contains(&"Gym"));
        assert_eq!(outcome.diagnostics.len(), 2);
    }

    #[test]
    fn test_custom_line_with_empty_address_skipped_without_lookup() {
        let geocoder = geocoder();
        let params = Parameters {
            custom_locations_raw: Some("Label only,   ".to_string()),
            ..Parameters::default()
        };
        let outcome = build(&params, &geocoder);

        assert_eq!(geocoder.lookups(), 0);
        assert!(matches!(&outcome.diagnostics[..], [Diagnostic::AddressSkipped { .. }]));
    }

    #[test]
    fn test_repeated_address_geocoded_once() {
        let geocoder = geocoder();
        let params = Parameters {
            add_city_address: Some("Baltimore, MD".to_string()),
            custom_locations_raw: Some("Office,Baltimore, MD\nClient,Baltimore, MD".to_string()),
            ..Parameters::default()
        };
        let outcome = build(&params, &geocoder);

        assert_eq!(geocoder.lookups(), 1);
        assert_eq!(outcome.locations.iter().filter(|l| l.origin == LocationOrigin::Custom).count(), 2);
    }

    #[test]
    fn test_custom_distance_function() {
        fn flat(_a: Coordinates, _b: Coordinates) -> f64 {
            42.0
        }

        let geocoder = geocoder();
        let mut resolver = AddressResolver::new(&geocoder, RetryPolicy::immediate(3));
        let outcome = LocationSetBuilder::with_distance(flat).build(
            &base_rows(),
            &Parameters::default(),
            HOME,
            &mut resolver,
        );

        assert!(outcome.locations[1..].iter().all(|l| l.distance_miles == 42.0));
    }
}
