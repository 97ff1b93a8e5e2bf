#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::num::NonZero;

    use itertools::Itertools;
    use proptest::prelude::*;
    use varisat::{Lit, Var};

    use crate::builder::GridBuilder;
    use crate::cell::{Cell, SolvedCell};
    use crate::decoder::{decode, SolvedGrid};
    use crate::encoder::{BridgeRule, ClauseCompiler, Cnf, EncoderConfig};
    use crate::error::{FormatError, SolveError};
    use crate::grid::Grid;
    use crate::indexer::VarIndexer;
    use crate::location::{Location, Step};
    use crate::logic::{exactly, exactly_one};
    use crate::solver::{Assignment, Outcome, SatBackend, SatOutcome, VarisatBackend};

    // flow free classic pack level 1
    const CLASSIC: &str = "A*B*D
**C*E
*****
*B*D*
*ACE*
";

    // flow free bridges starter pack 5x5 level 2
    const BRIDGES: &str = "CD*AE
**+**
**D**
*AE*B
CB***
";

    const SMALL_BRIDGE: &str = "A*B
*+*
B*A
";

    const STRAIGHT: EncoderConfig = EncoderConfig { bridge_rule: BridgeRule::Straight };

    fn parse(text: &str) -> Grid {
        text.parse().unwrap()
    }

    fn solve(grid: &Grid, config: EncoderConfig) -> SolvedGrid {
        match grid.solve_with(config, &mut VarisatBackend).unwrap() {
            Outcome::Solved(solved) => solved,
            Outcome::Unsatisfiable => panic!("expected a solution for\n{grid}"),
        }
    }

    fn dims(rows: usize, cols: usize) -> (NonZero<usize>, NonZero<usize>) {
        (NonZero::new(rows).unwrap(), NonZero::new(cols).unwrap())
    }

    fn dimacs(clauses: &[Vec<Lit>]) -> Vec<Vec<isize>> {
        clauses.iter()
            .map(|clause| clause.iter().map(|lit| lit.to_dimacs()).collect_vec())
            .collect_vec()
    }

    fn satisfied(clauses: &[Vec<Lit>], truth: impl Fn(Var) -> bool) -> bool {
        clauses.iter().all(|clause| clause.iter().any(|lit| truth(lit.var()) == lit.is_positive()))
    }

    /// Endpoints keep their colors and every path segment continues to exactly the right number of neighbors.
    fn assert_consistent(grid: &Grid, solved: &SolvedGrid) {
        for (row, col) in (0..grid.rows()).cartesian_product(0..grid.cols()) {
            let location = Location(row, col);
            let degree = |color| grid.neighbors(location)
                .into_iter()
                .filter(|neighbor| solved.cell(*neighbor).unwrap().carries(color))
                .count();

            match (grid.cell(location).unwrap(), solved.cell(location).unwrap()) {
                (Cell::Terminus { color: expected }, SolvedCell::Terminus { color }) => {
                    assert_eq!(*color, expected, "endpoint at {location} changed color");
                    assert_eq!(degree(*color), 1, "endpoint at {location}");
                }
                (Cell::Empty, SolvedCell::Path { color }) => assert_eq!(degree(*color), 2, "path at {location}"),
                (Cell::Bridge, SolvedCell::Bridge { colors }) => {
                    assert_eq!(colors.len(), 2, "bridge at {location}");
                    for color in colors {
                        assert_eq!(degree(*color), 2, "bridge at {location}, color {color}");
                    }
                }
                (cell, solved_cell) => panic!("{cell:?} at {location} solved as {solved_cell:?}"),
            }
        }
    }

    fn assert_straight_through(grid: &Grid, solved: &SolvedGrid) {
        for bridge in grid.bridges() {
            let Some(SolvedCell::Bridge { colors }) = solved.cell(bridge) else {
                panic!("bridge at {bridge} lost");
            };

            for color in colors {
                let carries = |step| grid.step(bridge, step)
                    .is_some_and(|neighbor| solved.cell(neighbor).unwrap().carries(*color));
                let vertical = carries(Step::Up) && carries(Step::Down);
                let horizontal = carries(Step::Left) && carries(Step::Right);
                assert!(vertical != horizontal, "color {color} turns on the bridge at {bridge}");
            }
        }
    }

    #[test]
    fn parse_round_trips_display() {
        assert_eq!(format!("{}", parse(BRIDGES)), BRIDGES);
        assert_eq!(format!("{}", parse("  AB \n AB\n\n")), "AB\nAB\n");
    }

    #[test]
    fn colors_number_in_order_of_appearance() {
        let grid = parse(BRIDGES);

        assert_eq!(grid.num_colors(), 5);
        assert_eq!(grid.palette().color_of('C'), Some(0));
        assert_eq!(grid.palette().color_of('A'), Some(2));
        assert_eq!(grid.palette().display_of(4), Some('B'));
        assert_eq!(grid.color_of('E'), Some(3));
        assert_eq!(grid.color_of('F'), None);
        assert_eq!(grid.display_of(1), Some('D'));
        assert_eq!(grid.display_of(5), None);
        assert_eq!(grid.endpoints(2), Some((Location(0, 3), Location(3, 1))));
        assert_eq!(grid.cell(Location(1, 2)), Some(Cell::Bridge));
        assert_eq!(grid.bridges().collect_vec(), vec![Location(1, 2)]);
    }

    #[test]
    fn builder_matches_parser() {
        let built = GridBuilder::with_dims(dims(5, 5))
            .add_termini('C', (Location(0, 0), Location(4, 0)))
            .add_termini('D', (Location(0, 1), Location(2, 2)))
            .add_termini('A', (Location(0, 3), Location(3, 1)))
            .add_termini('E', (Location(0, 4), Location(3, 2)))
            .add_termini('B', (Location(3, 4), Location(4, 1)))
            .add_bridge(Location(1, 2))
            .build()
            .unwrap();

        assert_eq!(built, parse(BRIDGES));
    }

    #[test]
    fn remove_termini() {
        let grid = GridBuilder::with_dims(dims(2, 3))
            .add_termini('A', (Location(0, 0), Location(1, 2)))
            .add_termini('B', (Location(0, 1), Location(0, 2)))
            .pop_termini()
            .build()
            .unwrap();

        assert_eq!(format!("{}", grid), "A**\n**A\n");
        assert_eq!(grid.num_colors(), 1);
    }

    #[test]
    fn malformed_text() {
        assert_eq!(Grid::parse("AB*\nAB"), Err(FormatError::RaggedRows { row: 1, expected: 3, found: 2 }));
        assert_eq!(Grid::parse("A*A\n*A*"), Err(FormatError::EndpointCount { display: 'A', found: 3 }));
        assert_eq!(Grid::parse("A**\nB*B"), Err(FormatError::EndpointCount { display: 'A', found: 1 }));
        assert_eq!(Grid::parse(""), Err(FormatError::EmptyGrid));
        assert_eq!(Grid::parse(" \n\n"), Err(FormatError::EmptyGrid));
        assert_eq!(Grid::parse("**\n*+"), Err(FormatError::NoColors));
    }

    #[test]
    fn declared_color_count() {
        assert_eq!(Grid::parse_with_colors("AB\nAB", 3), Err(FormatError::ColorCountMismatch { declared: 3, found: 2 }));
        assert_eq!(Grid::parse_with_colors("AB\nAB", 2), Ok(parse("AB\nAB")));
    }

    #[test]
    fn invalid_builders() {
        let mut builder = GridBuilder::with_dims(dims(2, 2));
        builder.add_termini('A', (Location(0, 0), Location(2, 0)));
        assert!(builder.is_valid().is_some());
        assert_eq!(builder.build(), Err(FormatError::OutOfBounds { location: Location(2, 0), rows: 2, cols: 2 }));

        let overlapping = GridBuilder::with_dims(dims(2, 2))
            .add_termini('A', (Location(0, 0), Location(0, 1)))
            .add_bridge(Location(0, 1))
            .build();
        assert_eq!(overlapping, Err(FormatError::Overlapping(Location(0, 1))));

        let reserved = GridBuilder::with_dims(dims(2, 2))
            .add_termini('+', (Location(0, 0), Location(0, 1)))
            .build();
        assert_eq!(reserved, Err(FormatError::ReservedDisplay('+')));

        let duplicate = GridBuilder::with_dims(dims(2, 2))
            .add_termini('A', (Location(0, 0), Location(0, 1)))
            .add_termini('A', (Location(1, 0), Location(1, 1)))
            .build();
        assert_eq!(duplicate, Err(FormatError::DuplicateColor('A')));
    }

    #[test]
    fn colors_differing_in_case_collide() {
        assert_eq!(Grid::parse("a*a\nA*A"), Err(FormatError::CaseCollision { display: 'A', existing: 'a' }));

        let built = GridBuilder::with_dims(dims(2, 2))
            .add_termini('X', (Location(0, 0), Location(0, 1)))
            .add_termini('x', (Location(1, 0), Location(1, 1)))
            .build();
        assert_eq!(built, Err(FormatError::CaseCollision { display: 'x', existing: 'X' }));

        // caseless characters are fine, each keeps its own color
        let digits = parse("1*1\n2*2");
        assert_eq!(format!("{}", solve(&digits, EncoderConfig::default())), "111\n222\n");
    }

    #[test]
    fn neighborhoods() {
        let grid = parse(SMALL_BRIDGE);

        assert_eq!(grid.neighbors(Location(0, 0)), vec![Location(1, 0), Location(0, 1)]);
        assert_eq!(grid.neighbors(Location(0, 1)), vec![Location(1, 1), Location(0, 0), Location(0, 2)]);
        assert_eq!(grid.neighbors(Location(1, 1)), vec![Location(0, 1), Location(2, 1), Location(1, 0), Location(1, 2)]);
        assert_eq!(grid.neighbors(Location(2, 2)), vec![Location(1, 2), Location(2, 1)]);
        assert_eq!(grid.step(Location(0, 2), Step::Right), None);

        assert_eq!(grid.connecting_cells().collect_vec(), vec![Location(0, 1), Location(1, 0), Location(1, 2), Location(2, 1)]);
        assert_eq!(grid.bridges().collect_vec(), vec![Location(1, 1)]);
    }

    #[test]
    fn indexer_covers_every_id_once() {
        // rows != cols, so a formula mixing them up would collide or leave gaps
        let indexer = VarIndexer::new(2, 3, 2);
        let ids = (0..2).cartesian_product(0..3).cartesian_product(0..2)
            .map(|((row, col), color)| indexer.encode(Location(row, col), color).to_dimacs())
            .collect::<HashSet<_>>();

        assert_eq!(indexer.var_count(), 12);
        assert_eq!(ids, (1..=12).collect::<HashSet<_>>());
        assert_eq!(indexer.encode(Location(1, 2), 1).to_dimacs(), 12);
        assert_eq!(indexer.decode(Var::from_dimacs(7)), (Location(0, 0), 1));
    }

    #[test]
    #[should_panic]
    fn indexer_rejects_out_of_range_colors() {
        VarIndexer::new(2, 2, 2).encode(Location(0, 0), 2);
    }

    proptest! {
        #[test]
        fn indexer_round_trips(
            (rows, cols, colors, row, col, color) in (1usize..12, 1usize..12, 1usize..8)
                .prop_flat_map(|(rows, cols, colors)| (Just(rows), Just(cols), Just(colors), 0..rows, 0..cols, 0..colors))
        ) {
            let indexer = VarIndexer::new(rows, cols, colors);
            let var = indexer.encode(Location(row, col), color);

            prop_assert!(var.to_dimacs() >= 1);
            prop_assert!(var.to_dimacs() as usize <= indexer.var_count());
            prop_assert_eq!(indexer.decode(var), (Location(row, col), color));
        }
    }

    #[test]
    fn exactly_two_of_three_and_four() {
        let [g, a, b, c, d] = [0, 1, 2, 3, 4].map(|i| Var::from_index(i).positive());

        assert_eq!(exactly(2, &[a, b], Some(g)), vec![vec![!g, a], vec![!g, b]]);
        assert_eq!(exactly(2, &[a, b, c], Some(g)), vec![
            vec![!g, !a, !b, !c],
            vec![!g, a, b],
            vec![!g, a, c],
            vec![!g, b, c],
        ]);
        assert_eq!(exactly(2, &[a, b, c, d], Some(g)).len(), 8);
    }

    #[test]
    fn too_few_literals_is_impossible() {
        let [g, a] = [0, 1].map(|i| Var::from_index(i).positive());

        assert_eq!(exactly(2, &[a], Some(g)), vec![vec![!g]]);
        assert_eq!(exactly_one(&[]), vec![Vec::<Lit>::new()]);
    }

    #[test]
    fn exactly_counts_true_literals() {
        for (len, n) in (0..=4usize).cartesian_product(0..=3usize) {
            let lits = (0..len).map(|i| Var::from_index(i).positive()).collect_vec();
            let guard = Var::from_index(len).positive();
            let clauses = exactly(n, &lits, Some(guard));

            for mask in 0..(1u32 << len) {
                let chosen = |var: Var| var.index() < len && mask & (1 << var.index()) != 0;

                assert_eq!(
                    satisfied(&clauses, |var| var.index() == len || chosen(var)),
                    mask.count_ones() as usize == n,
                    "exactly {n} of {len}, mask {mask:b}",
                );
                assert!(satisfied(&clauses, chosen), "guard off, exactly {n} of {len}, mask {mask:b}");
            }
        }
    }

    #[test]
    fn endpoint_clauses() {
        let grid = parse("AB\nAB");
        let compiler = ClauseCompiler::new(&grid, EncoderConfig::default());

        // A at (0, 0): it is A, it is not B, exactly one of (1, 0) and (0, 1) is A
        assert_eq!(dimacs(&compiler.endpoint_clauses()[..4]), vec![vec![1], vec![-5], vec![-3, -2], vec![3, 2]]);
        assert!(compiler.single_color_clauses().is_empty());
        assert!(compiler.path_clauses().is_empty());
        assert!(compiler.bridge_clauses().is_empty());
    }

    #[test]
    fn connecting_cell_clauses() {
        let grid = parse("A*A");
        let compiler = ClauseCompiler::new(&grid, EncoderConfig::default());

        assert_eq!(dimacs(&compiler.single_color_clauses()), vec![vec![2]]);
        assert_eq!(dimacs(&compiler.path_clauses()), vec![vec![-2, 1], vec![-2, 3]]);
        assert_eq!(grid.encode(EncoderConfig::default()).len(), 7);
    }

    #[test]
    fn compilation_is_deterministic() {
        let grid = parse(BRIDGES);

        for config in [EncoderConfig::default(), STRAIGHT] {
            let first = grid.encode(config);
            let second = grid.encode(config);
            assert_eq!(first, second);
            assert_eq!(
                first.clauses().iter().collect::<HashSet<_>>(),
                second.clauses().iter().collect::<HashSet<_>>(),
            );
        }
    }

    #[test]
    fn dimacs_output() {
        let cnf = parse("AB\nAB").encode(EncoderConfig::default());
        let text = cnf.to_string();

        assert_eq!(cnf.var_count(), 8);
        assert_eq!(text.lines().next(), Some("p cnf 8 16"));
        assert_eq!(text.lines().nth(1), Some("1 0"));
        assert_eq!(text.lines().count(), 17);

        let mut written = Vec::new();
        cnf.write_dimacs(&mut written).unwrap();
        assert_eq!(String::from_utf8(written).unwrap(), text);
    }

    #[test]
    fn solve_all_endpoints() {
        let grid = parse("AB\nAB");
        let solved = solve(&grid, EncoderConfig::default());

        assert_eq!(format!("{}", solved), "AB\nAB\n");
        assert_consistent(&grid, &solved);
    }

    #[test]
    fn solve_single_path() {
        let grid = parse("A*A");
        let solved = solve(&grid, EncoderConfig::default());

        assert_eq!(format!("{}", solved), "AaA\n");
        assert_eq!(solved.color_at(Location(0, 1)), Some(0));
    }

    #[test]
    fn crossed_endpoints_are_unsatisfiable() {
        // every endpoint's only neighbors belong to the other color
        assert_eq!(parse("AB\nBA").solve().unwrap(), Outcome::Unsatisfiable);
        assert_eq!(parse("A\nB\nA\nB").solve().unwrap(), Outcome::Unsatisfiable);
    }

    #[test]
    fn bridge_needs_two_colors() {
        assert_eq!(parse("A+A").solve().unwrap(), Outcome::Unsatisfiable);
    }

    #[test]
    fn empty_clause_is_unsatisfiable() {
        let mut cnf = Cnf::new(1);
        cnf.extend(exactly_one(&[]));

        assert_eq!(VarisatBackend.solve(&cnf).unwrap(), SatOutcome::Unsatisfiable);
    }

    #[test]
    fn solve_most_basic() {
        let grid = parse(CLASSIC);
        let solved = solve(&grid, EncoderConfig::default());

        assert_consistent(&grid, &solved);
    }

    #[test]
    fn small_bridge() {
        let grid = parse(SMALL_BRIDGE);

        for config in [EncoderConfig::default(), STRAIGHT] {
            let solved = solve(&grid, config);

            assert_consistent(&grid, &solved);
            assert_straight_through(&grid, &solved);
            assert!(["AaB\nb+b\nBaA\n", "AbB\na+a\nBbA\n"].contains(&format!("{}", solved).as_str()), "{solved}");
            assert_eq!(solved.cell(Location(1, 1)), Some(&SolvedCell::Bridge { colors: vec![0, 1] }));
        }
    }

    #[test]
    fn bridge_holds_two_true_colors() {
        let grid = parse(SMALL_BRIDGE);
        let indexer = VarIndexer::for_grid(&grid);

        let SatOutcome::Satisfiable(assignment) = VarisatBackend.solve(&grid.encode(EncoderConfig::default())).unwrap() else {
            panic!("expected a solution");
        };

        let at_bridge = grid.colors()
            .filter(|color| assignment.is_true(indexer.encode(Location(1, 1), *color)))
            .count();
        assert_eq!(at_bridge, 2);
    }

    #[test]
    fn simple_with_bridge() {
        let grid = parse(BRIDGES);

        let loose = solve(&grid, EncoderConfig::default());
        assert_consistent(&grid, &loose);

        let straight = solve(&grid, STRAIGHT);
        assert_consistent(&grid, &straight);
        assert_straight_through(&grid, &straight);
    }

    #[test]
    fn straight_bridges_forbid_turns() {
        for (text, expected) in [
            ("*B*A\n**+*\nBA**", "bBaA\nba+b\nBAbb\n"),
            ("C*A*B\n*AB+*\n**C**", "CaAbB\ncAB+a\nccCaa\n"),
        ] {
            let grid = parse(text);

            // the only loose solution turns a color on the bridge
            let loose = solve(&grid, EncoderConfig::default());
            assert_consistent(&grid, &loose);
            assert_eq!(format!("{}", loose), expected);

            assert_eq!(grid.solve_with(STRAIGHT, &mut VarisatBackend).unwrap(), Outcome::Unsatisfiable);
        }
    }

    #[test]
    fn decoding_rejects_broken_assignments() {
        let grid = parse("A*A");
        let indexer = VarIndexer::for_grid(&grid);
        let uncolored = Assignment::from_true_vars([
            indexer.encode(Location(0, 0), 0),
            indexer.encode(Location(0, 2), 0),
        ]);
        assert!(matches!(decode(&grid, &uncolored), Err(SolveError::UncoloredCell(Location(0, 1)))));

        let grid = parse("A*A\nB*B");
        let indexer = VarIndexer::for_grid(&grid);
        let ambiguous = Assignment::from_true_vars([
            ((0, 0), 0), ((0, 1), 0), ((0, 1), 1), ((0, 2), 0),
            ((1, 0), 1), ((1, 1), 1), ((1, 2), 1),
        ].map(|((row, col), color)| indexer.encode(Location(row, col), color)));
        assert!(matches!(
            decode(&grid, &ambiguous),
            Err(SolveError::AmbiguousCell { location: Location(0, 1), colors }) if colors == vec![0, 1]
        ));

        let grid = parse("AB\nAB");
        let indexer = VarIndexer::for_grid(&grid);
        let recolored = Assignment::from_true_vars([
            ((0, 0), 1), ((0, 1), 1), ((1, 0), 0), ((1, 1), 1),
        ].map(|((row, col), color)| indexer.encode(Location(row, col), color)));
        assert!(matches!(
            decode(&grid, &recolored),
            Err(SolveError::TerminusMismatch { location: Location(0, 0), expected: 0, found: 1 })
        ));
    }

    #[test]
    fn custom_backend() {
        struct Refuses;

        impl SatBackend for Refuses {
            fn solve(&mut self, _cnf: &Cnf) -> Result<SatOutcome, SolveError> {
                Ok(SatOutcome::Unsatisfiable)
            }
        }

        assert_eq!(parse("AB\nAB").solve_with(EncoderConfig::default(), &mut Refuses).unwrap(), Outcome::Unsatisfiable);
    }
}
