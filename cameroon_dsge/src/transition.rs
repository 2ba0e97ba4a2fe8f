//! Hand-calibrated transition matrix
//!
//! Rows and columns follow [`Variable::ALL`](crate::Variable::ALL). The
//! weights are fixed constants, not derived from first-order conditions. The
//! largest eigenvalue is about 1.46, so responses keep growing with the
//! horizon even under the 0.8/0.9 persistence damping.

use statespace::TransitionMatrix;

use crate::NUM_VARIABLES;

#[rustfmt::skip]
pub const TRANSITION_ROWS: [[f64; NUM_VARIABLES]; NUM_VARIABLES] = [
    //  Y     C     I     PI     R     W     L     NX    G     TAU    DEBT   CR    SPR    RER   YGAP
    [0.85, 0.15, 0.20, -0.05, -0.12, 0.08, 0.12, 0.05, 0.08, 0.02, -0.01, 0.15, -0.03, 0.06, 0.10], // Output
    [0.25, 0.75, 0.08, -0.03, -0.08, 0.12, 0.06, 0.02, 0.04, -0.02, 0.00, 0.08, -0.02, 0.03, 0.05], // Consumption
    [0.15, 0.05, 0.65, -0.02, -0.15, 0.10, 0.15, 0.03, 0.06, -0.01, 0.00, 0.25, -0.04, 0.04, 0.08], // Investment
    [0.08, 0.03, 0.02,  0.55,  0.20, 0.05, 0.03, 0.02, 0.04,  0.02, 0.02, 0.03,  0.08, 0.12, 0.06], // Inflation
    [0.06, 0.02, 0.02,  0.25,  0.75, 0.02, 0.02, 0.01, 0.02,  0.01, 0.02, 0.02,  0.12, 0.08, 0.15], // Interest Rate
    [0.12, 0.10, 0.06,  0.03, -0.04, 0.80, 0.25, 0.02, 0.03,  0.01, 0.00, 0.10, -0.02, 0.03, 0.08], // Real Wage
    [0.15, 0.08, 0.10,  0.02, -0.06, 0.20, 0.75, 0.02, 0.05,  0.01, 0.00, 0.12, -0.02, 0.02, 0.10], // Labor
    [0.04, 0.02, 0.03,  0.04, -0.03, 0.03, 0.02, 0.65, 0.01,  0.00, 0.00, 0.02,  0.03, 0.35, 0.03], // Net Exports
    [0.03, 0.02, 0.02,  0.02,  0.02, 0.02, 0.02, 0.00, 0.70,  0.12, 0.08, 0.02,  0.00, 0.00, 0.04], // Government Spending
    [0.04, 0.03, 0.02,  0.03,  0.02, 0.03, 0.02, 0.00, 0.18,  0.75, 0.12, 0.03,  0.00, 0.00, 0.05], // Tax Revenue
    [0.02, 0.01, 0.01,  0.02,  0.03, 0.01, 0.01, 0.00, 0.12,  0.08, 0.90, 0.01,  0.02, 0.00, 0.02], // Public Debt
    [0.12, 0.06, 0.18,  0.02, -0.12, 0.10, 0.12, 0.02, 0.03,  0.01, 0.00, 0.75,  0.06, 0.03, 0.08], // Credit
    [0.03, 0.02, 0.02,  0.06,  0.12, 0.02, 0.02, 0.02, 0.01,  0.00, 0.02, 0.04,  0.75, 0.08, 0.04], // Banking Spread
    [0.04, 0.02, 0.03,  0.10,  0.06, 0.03, 0.02, 0.35, 0.00,  0.00, 0.00, 0.03,  0.06, 0.75, 0.04], // Real Exchange Rate
    [0.12, 0.08, 0.06,  0.08,  0.10, 0.08, 0.10, 0.03, 0.03,  0.02, 0.01, 0.08,  0.03, 0.04, 0.70], // Output Gap
];

pub fn transition_matrix() -> TransitionMatrix<NUM_VARIABLES> {
    TransitionMatrix::new(TRANSITION_ROWS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Variable;
    use statespace::Trajectory;

    #[test]
    fn own_persistence_on_diagonal() {
        let a = transition_matrix();
        let diagonal = |v: Variable| a.get(v.index(), v.index());

        assert_eq!(diagonal(Variable::Output), 0.85);
        assert_eq!(diagonal(Variable::Inflation), 0.55);
        assert_eq!(diagonal(Variable::PublicDebt), 0.90);
        assert_eq!(diagonal(Variable::OutputGap), 0.70);
    }

    #[test]
    fn interest_rate_weighs_on_investment_and_credit() {
        let a = transition_matrix();
        let r = Variable::InterestRate.index();

        assert_eq!(a.get(Variable::Investment.index(), r), -0.15);
        assert_eq!(a.get(Variable::Credit.index(), r), -0.12);
    }

    #[test]
    fn exchange_rate_and_net_exports_are_coupled() {
        let a = transition_matrix();
        let nx = Variable::NetExports.index();
        let rer = Variable::RealExchangeRate.index();

        assert_eq!(a.get(nx, rer), 0.35);
        assert_eq!(a.get(rer, nx), 0.35);
    }

    #[test]
    fn undamped_paths_grow() {
        use statespace::{LinearSystem, Propagation};

        let system = LinearSystem::new(transition_matrix(), Propagation::PureMatrix);
        let path = system.impulse_response(&[1.0; NUM_VARIABLES], 21).unwrap();
        let last = Trajectory::from_states(path.states()[20..].to_vec());

        assert_eq!(path.period(1), Some(&[1.0; NUM_VARIABLES]));
        assert!(last.max_abs() > 1000.0, "{}", last.max_abs());
        assert_eq!(path.max_abs(), last.max_abs());
    }
}
