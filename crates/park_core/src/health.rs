//! Fleet health findings: capacity vs. demand, staffing vs. requirement,
//! fleet size. Diagnostic only; findings never mutate state.

use std::fmt;

use serde::Serialize;

use crate::capacity::aggregate_capacity;
use crate::types::{Coaster, Wagon};

/// Minimum workable fleet size before a finding is raised.
pub const MIN_WAGONS: u32 = 3;

/// One base attendant plus two per wagon.
pub fn required_staff(wagon_count: usize) -> u32 {
    1 + 2 * wagon_count as u32
}

/// A wagons-and-staff delta attached to a capacity finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FleetChange {
    pub wagons: u32,
    pub staff: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "finding", rename_all = "snake_case")]
pub enum Finding {
    InsufficientCapacity {
        missing_daily_seats: u64,
        /// Absent when the fleet is empty: with no wagons there is no
        /// average wagon capacity to size the suggestion from.
        expansion: Option<FleetChange>,
    },
    ExcessCapacity {
        excess_daily_seats: u64,
        reduction: FleetChange,
    },
    UnderStaffed {
        missing: u32,
        required: u32,
        current: u32,
    },
    OverStaffed {
        extra: u32,
        required: u32,
        current: u32,
    },
    NoWagons,
    TooFewWagons {
        count: u32,
        minimum: u32,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientCapacity {
                missing_daily_seats,
                expansion,
            } => {
                write!(
                    f,
                    "insufficient capacity: short {missing_daily_seats} seats daily"
                )?;
                if let Some(change) = expansion {
                    write!(
                        f,
                        "; add {} wagons and {} staff",
                        change.wagons, change.staff
                    )?;
                }
                Ok(())
            }
            Self::ExcessCapacity {
                excess_daily_seats,
                reduction,
            } => write!(
                f,
                "excess capacity: {excess_daily_seats} seats daily over twice the target; \
                 could release {} wagons and {} staff",
                reduction.wagons, reduction.staff
            ),
            Self::UnderStaffed {
                missing,
                required,
                current,
            } => write!(
                f,
                "understaffed: missing {missing} (need {required}, have {current})"
            ),
            Self::OverStaffed {
                extra,
                required,
                current,
            } => write!(
                f,
                "overstaffed: {extra} extra (need {required}, have {current})"
            ),
            Self::NoWagons => write!(f, "no wagons attached"),
            Self::TooFewWagons { count, minimum } => {
                write!(f, "too few wagons ({count} of minimum {minimum})")
            }
        }
    }
}

/// Produces findings in a fixed order (capacity, staffing, fleet size) with
/// at most one finding per category; branches are mutually exclusive.
pub fn diagnose(coaster: &Coaster, wagons: &[Wagon]) -> Vec<Finding> {
    let mut findings = Vec::new();
    let wagon_count = wagons.len();
    let capacity = aggregate_capacity(coaster, wagons);
    let target = f64::from(coaster.daily_customer_target);

    if capacity.daily_capacity < target {
        let missing = target - capacity.daily_capacity;
        findings.push(Finding::InsufficientCapacity {
            missing_daily_seats: missing.ceil() as u64,
            expansion: expansion_for(missing, capacity.daily_capacity, wagon_count),
        });
    } else if capacity.daily_capacity > 2.0 * target {
        let excess = capacity.daily_capacity - 2.0 * target;
        // daily_capacity > 0 here, so the fleet is non-empty.
        let avg_wagon_capacity = capacity.daily_capacity / wagon_count as f64;
        let wagons_reducible = (excess / avg_wagon_capacity).floor() as u32;
        findings.push(Finding::ExcessCapacity {
            excess_daily_seats: excess.ceil() as u64,
            reduction: FleetChange {
                wagons: wagons_reducible,
                staff: wagons_reducible * 2,
            },
        });
    }

    let required = required_staff(wagon_count);
    let current = coaster.staff_count;
    if current < required {
        findings.push(Finding::UnderStaffed {
            missing: required - current,
            required,
            current,
        });
    } else if current > required {
        findings.push(Finding::OverStaffed {
            extra: current - required,
            required,
            current,
        });
    }

    if wagon_count == 0 {
        findings.push(Finding::NoWagons);
    } else if (wagon_count as u32) < MIN_WAGONS {
        findings.push(Finding::TooFewWagons {
            count: wagon_count as u32,
            minimum: MIN_WAGONS,
        });
    }

    findings
}

fn expansion_for(missing: f64, daily_capacity: f64, wagon_count: usize) -> Option<FleetChange> {
    if wagon_count == 0 {
        return None;
    }
    let avg_wagon_capacity = daily_capacity / wagon_count as f64;
    if avg_wagon_capacity <= 0.0 {
        return None;
    }
    let wagons = (missing / avg_wagon_capacity).ceil() as u32;
    Some(FleetChange {
        wagons,
        staff: wagons * 2,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{coaster_with, standard_wagon};

    #[test]
    fn required_staff_is_one_plus_two_per_wagon() {
        for count in 0..50 {
            assert_eq!(required_staff(count), 1 + 2 * count as u32);
        }
    }

    #[test]
    fn scenario_d_empty_fleet() {
        // Zero wagons: a plain shortfall with no expansion suggestion, plus
        // the fleet-size finding. Required staff is just the base attendant.
        let coaster = coaster_with(1, 200);
        let findings = diagnose(&coaster, &[]);

        assert_eq!(
            findings,
            vec![
                Finding::InsufficientCapacity {
                    missing_daily_seats: 200,
                    expansion: None,
                },
                Finding::NoWagons,
            ]
        );
        assert_eq!(required_staff(0), 1);
    }

    #[test]
    fn insufficient_capacity_sizes_the_expansion() {
        // One wagon moves ~2175 daily seats; demand of 5000 wants ~2 more.
        let coaster = coaster_with(3, 5000);
        let findings = diagnose(&coaster, &[standard_wagon()]);

        let Some(Finding::InsufficientCapacity {
            missing_daily_seats,
            expansion: Some(change),
        }) = findings.first()
        else {
            panic!("expected a capacity shortfall with expansion, got {findings:?}");
        };
        assert!(*missing_daily_seats > 0);
        assert!(change.wagons >= 1);
        assert_eq!(change.staff, change.wagons * 2);
    }

    #[test]
    fn excess_capacity_sizes_the_reduction() {
        // Six wagons against a tiny target: well over twice the demand.
        let coaster = coaster_with(13, 100);
        let wagons = vec![standard_wagon(); 6];
        let findings = diagnose(&coaster, &wagons);

        let Some(Finding::ExcessCapacity {
            excess_daily_seats,
            reduction,
        }) = findings.first()
        else {
            panic!("expected an excess-capacity finding, got {findings:?}");
        };
        assert!(*excess_daily_seats > 0);
        assert!(reduction.wagons >= 1);
        assert_eq!(reduction.staff, reduction.wagons * 2);
    }

    #[test]
    fn at_most_one_capacity_finding() {
        // In-band capacity (target < daily < 2×target) raises nothing.
        // Three wagons move ~6525 daily seats against a target of 5000.
        let wagons = vec![standard_wagon(); 3];
        let coaster = coaster_with(7, 5000);
        let findings = diagnose(&coaster, &wagons);
        assert!(
            !findings.iter().any(|f| matches!(
                f,
                Finding::InsufficientCapacity { .. } | Finding::ExcessCapacity { .. }
            )),
            "in-band capacity should raise no capacity finding: {findings:?}"
        );
    }

    #[test]
    fn staffing_findings_compare_against_requirement() {
        let wagons = vec![standard_wagon(); 3];

        let under = diagnose(&coaster_with(5, 500), &wagons);
        assert!(under.contains(&Finding::UnderStaffed {
            missing: 2,
            required: 7,
            current: 5
        }));

        let over = diagnose(&coaster_with(9, 500), &wagons);
        assert!(over.contains(&Finding::OverStaffed {
            extra: 2,
            required: 7,
            current: 9
        }));

        let exact = diagnose(&coaster_with(7, 500), &wagons);
        assert!(
            !exact.iter().any(|f| matches!(
                f,
                Finding::UnderStaffed { .. } | Finding::OverStaffed { .. }
            )),
            "exact staffing should raise no staffing finding: {exact:?}"
        );
    }

    #[test]
    fn small_fleet_finding() {
        let coaster = coaster_with(5, 400);
        let findings = diagnose(&coaster, &[standard_wagon(), standard_wagon()]);
        assert!(findings.contains(&Finding::TooFewWagons {
            count: 2,
            minimum: 3
        }));
    }

    #[test]
    fn findings_keep_category_order() {
        // Force all three categories at once and check the fixed order.
        let coaster = coaster_with(1, 1000);
        let findings = diagnose(&coaster, &[standard_wagon()]);

        let kinds: Vec<&str> = findings
            .iter()
            .map(|f| match f {
                Finding::InsufficientCapacity { .. } | Finding::ExcessCapacity { .. } => "capacity",
                Finding::UnderStaffed { .. } | Finding::OverStaffed { .. } => "staffing",
                Finding::NoWagons | Finding::TooFewWagons { .. } => "fleet",
            })
            .collect();
        assert_eq!(kinds, vec!["capacity", "staffing", "fleet"]);
    }
}
