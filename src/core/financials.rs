use crate::models::{FinancialBreakdown, Location, Parameters};

/// Social Security payroll rate
pub const SOCIAL_SECURITY_RATE: f64 = 0.062;
/// Medicare payroll rate
pub const MEDICARE_RATE: f64 = 0.0145;
/// Working weeks per year used to annualize commuting
pub const WORK_WEEKS_PER_YEAR: f64 = 48.0;
/// Length of a full commuting week
pub const WORK_DAYS_PER_WEEK: f64 = 5.0;

/// Calculate the annual financial breakdown for one location
///
/// Formula:
/// ```text
/// commute_miles = distance * 2 * 48 * (days / 5)     (0 when remote)
/// gas           = commute_miles / mpg * gas_price    (0 when remote)
/// fica          = 0.062 * salary + 0.0145 * salary
/// net           = salary - (gas + federal + state + fica
///                           + car_payment + insurance + healthcare)
/// ```
///
/// A row counts as remote when it is the synthetic remote row or when no
/// commute days are selected. Healthcare is charged either way. Every
/// deduction is rounded to cents first and net pay is salary minus those
/// rounded amounts, so it may be negative.
pub fn calculate_financials(location: &Location, params: &Parameters) -> FinancialBreakdown {
    let salary = params.annual_salary;
    let is_remote = location.is_remote || params.commute_days_selected == 0;

    let commute_miles = if is_remote {
        0.0
    } else {
        location.distance_miles
            * 2.0
            * WORK_WEEKS_PER_YEAR
            * (f64::from(params.commute_days_selected) / WORK_DAYS_PER_WEEK)
    };

    let gas_cost = if is_remote || params.vehicle_mpg <= 0.0 {
        0.0
    } else {
        commute_miles / params.vehicle_mpg * params.gas_price_per_gallon
    };

    let (car_payment, car_insurance) = if is_remote {
        (0.0, 0.0)
    } else {
        (params.annual_car_payment, params.annual_car_insurance)
    };

    let (federal_tax, state_tax) = params.tax_mode.annual_taxes(params);
    let fica = SOCIAL_SECURITY_RATE * salary + MEDICARE_RATE * salary;

    let mut breakdown = FinancialBreakdown {
        commute_miles_annual: round_cents(commute_miles),
        gas_cost_annual: round_cents(gas_cost),
        federal_tax_annual: round_cents(federal_tax),
        state_tax_annual: round_cents(state_tax),
        fica_annual: round_cents(fica),
        car_payment_annual: round_cents(car_payment),
        car_insurance_annual: round_cents(car_insurance),
        healthcare_annual: round_cents(params.annual_healthcare),
        net_pay_annual: 0.0,
    };

    // Net pay comes from the rounded deductions so the row balances to the cent
    breakdown.net_pay_annual = round_cents(salary - breakdown.total_deductions());
    breakdown
}

/// Round to two decimal places, halves away from zero
#[inline]
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, TaxMode};

    fn city(distance_miles: f64) -> Location {
        Location {
            distance_miles,
            ..Location::from_dataset("Baltimore, MD", Some(Coordinates::new(39.2904, -76.6122)), None)
        }
    }

    fn scenario_params() -> Parameters {
        Parameters {
            vehicle_mpg: 25.0,
            gas_price_per_gallon: 3.00,
            commute_days_selected: 5,
            ..Parameters::default()
        }
    }

    #[test]
    fn test_full_week_commute() {
        let breakdown = calculate_financials(&city(10.0), &scenario_params());

        assert_eq!(breakdown.commute_miles_annual, 960.0);
        assert_eq!(breakdown.gas_cost_annual, 115.20);
        assert_eq!(breakdown.car_payment_annual, 5_000.0);
        assert_eq!(breakdown.car_insurance_annual, 1_500.0);
    }

    #[test]
    fn test_partial_week_scales_linearly() {
        let params = Parameters {
            commute_days_selected: 2,
            ..scenario_params()
        };
        let breakdown = calculate_financials(&city(10.0), &params);

        assert_eq!(breakdown.commute_miles_annual, 384.0);
        assert_eq!(breakdown.gas_cost_annual, 46.08);
    }

    #[test]
    fn test_zero_days_treated_as_remote() {
        let params = Parameters {
            commute_days_selected: 0,
            ..scenario_params()
        };
        let breakdown = calculate_financials(&city(80.0), &params);

        assert_eq!(breakdown.commute_miles_annual, 0.0);
        assert_eq!(breakdown.gas_cost_annual, 0.0);
        assert_eq!(breakdown.car_payment_annual, 0.0);
        assert_eq!(breakdown.car_insurance_annual, 0.0);
        assert_eq!(breakdown.healthcare_annual, 9_000.0);
    }

    #[test]
    fn test_remote_row_keeps_healthcare() {
        let remote = Location::remote(Coordinates::new(38.8977, -77.0365), 100_000.0);
        let breakdown = calculate_financials(&remote, &scenario_params());

        assert_eq!(breakdown.commute_miles_annual, 0.0);
        assert_eq!(breakdown.gas_cost_annual, 0.0);
        assert_eq!(breakdown.car_payment_annual, 0.0);
        assert_eq!(breakdown.car_insurance_annual, 0.0);
        assert_eq!(breakdown.healthcare_annual, 9_000.0);
    }

    #[test]
    fn test_fica_rate_sum() {
        let breakdown = calculate_financials(&city(10.0), &scenario_params());
        assert_eq!(breakdown.fica_annual, 7_650.0);
    }

    #[test]
    fn test_net_pay_balances() {
        let params = scenario_params();
        let breakdown = calculate_financials(&city(37.3), &params);

        let total = breakdown.net_pay_annual + breakdown.total_deductions();
        assert!((total - params.annual_salary).abs() < 0.011);
    }

    #[test]
    fn test_net_pay_balances_with_fractional_taxes() {
        for cents in 0..2_000 {
            let params = Parameters {
                annual_salary: 100_000.0 + f64::from(cents) / 100.0,
                tax_mode: TaxMode::standard_rates(),
                ..scenario_params()
            };
            for step in 0..50 {
                let distance = 0.137 + f64::from(step) * 2.5;
                let breakdown = calculate_financials(&city(distance), &params);

                let total = breakdown.net_pay_annual + breakdown.total_deductions();
                assert!(
                    (total - params.annual_salary).abs() < 1e-6,
                    "salary {} distance {}: off by {}",
                    params.annual_salary,
                    distance,
                    total - params.annual_salary
                );
            }
        }
    }

    #[test]
    fn test_net_pay_may_be_negative() {
        let params = Parameters {
            annual_salary: 10_000.0,
            ..scenario_params()
        };
        let breakdown = calculate_financials(&city(50.0), &params);
        assert!(breakdown.net_pay_annual < 0.0);
    }

    #[test]
    fn test_rate_with_offset_mode() {
        let params = Parameters {
            tax_mode: TaxMode::standard_rates(),
            ..scenario_params()
        };
        let breakdown = calculate_financials(&city(10.0), &params);

        assert_eq!(breakdown.federal_tax_annual, 9_000.0);
        assert_eq!(breakdown.state_tax_annual, 4_500.0);
    }

    #[test]
    fn test_zero_mpg_has_no_fuel_cost() {
        let params = Parameters {
            vehicle_mpg: 0.0,
            ..scenario_params()
        };
        let breakdown = calculate_financials(&city(10.0), &params);

        assert_eq!(breakdown.gas_cost_annual, 0.0);
        assert!(breakdown.net_pay_annual.is_finite());
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(115.19999999999999), 115.2);
        assert_eq!(round_cents(0.125), 0.13);
        assert_eq!(round_cents(-0.125), -0.13);
    }
}
