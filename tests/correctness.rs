use matmul::threaded::{compute_blocks, compute_blocks_truncating};
use matmul::{
    CancellationToken, Engine, EngineConfig, Execution, Fill, Grid, MatmulError, Matrix, Variant,
    multiply_classic, multiply_parallel, multiply_transposed, try_multiply_classic,
    try_multiply_parallel, try_multiply_transposed,
};

fn assert_matrices_equal(expected: &Matrix, actual: &Matrix, name: &str) {
    assert_eq!(expected.shape(), actual.shape(), "{}: shape mismatch", name);
    let (e, a) = (expected.as_slice(), actual.as_slice());
    for i in 0..e.len() {
        assert!(
            e[i] == a[i],
            "{}: mismatch at index {}: expected {}, got {}",
            name,
            i,
            e[i],
            a[i]
        );
    }
}

/// Small repeating values keep every sum exact in f32.
fn patterned(rows: usize, cols: usize, modulo: usize) -> Matrix {
    let data = (0..rows * cols).map(|i| (i % modulo) as f32).collect();
    Matrix::from_vec(rows, cols, data).unwrap()
}

// ============================================================
// Matrix construction and access
// ============================================================

#[test]
fn test_fill_modes() {
    let z = Matrix::new(2, 3, Fill::Zero);
    assert!(z.as_slice().iter().all(|&v| v == 0.0));

    let inc = Matrix::new(2, 3, Fill::Increment);
    assert_eq!(inc.as_slice(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);

    let c = Matrix::new(2, 3, Fill::Constant(2.5));
    assert!(c.as_slice().iter().all(|&v| v == 2.5));
    assert_eq!(c.len(), 6);
}

#[test]
fn test_fill_from_option() {
    assert_eq!(Fill::from_option(None), Fill::Increment);
    assert_eq!(Fill::from_option(Some(3.0)), Fill::Constant(3.0));
}

#[test]
fn test_get_out_of_range_is_error() {
    let m = Matrix::increment(2, 2);
    assert_eq!(m.get(3).unwrap(), 3.0);
    assert!(matches!(
        m.get(4),
        Err(MatmulError::IndexOutOfRange { index: 4, len: 4 })
    ));
    assert_eq!(m.at(1, 0).unwrap(), 2.0);
    assert!(m.at(0, 2).is_err());
}

#[test]
fn test_from_vec_checks_length() {
    assert!(matches!(
        Matrix::from_vec(2, 3, vec![0.0; 5]),
        Err(MatmulError::InvalidDimension { rows: 2, cols: 3, len: 5 })
    ));
    assert!(Matrix::try_new(usize::MAX, 2, Fill::Zero).is_err());
}

#[test]
fn test_empty_matrix() {
    let m = Matrix::zeros(0, 4);
    assert!(m.is_empty());
    assert_eq!(m.transpose().shape(), (4, 0));
    assert_eq!(m.to_string(), "");
}

// ============================================================
// Transpose
// ============================================================

#[test]
fn test_transpose_increment_2x3() {
    let a = Matrix::increment(2, 3);
    let t = a.transpose();

    assert_eq!(t.shape(), (3, 2));
    assert_eq!(t.as_slice(), &[0.0, 3.0, 1.0, 4.0, 2.0, 5.0]);
    for i in 0..2 {
        for j in 0..3 {
            assert_eq!(t.at(j, i).unwrap(), a.at(i, j).unwrap());
        }
    }
}

#[test]
fn test_transpose_involution() {
    for (rows, cols) in [(1, 1), (1, 9), (4, 4), (3, 7), (16, 5)] {
        let m = patterned(rows, cols, 11);
        assert_matrices_equal(&m, &m.transpose().transpose(), "involution");
    }
}

// ============================================================
// Sequential kernels
// ============================================================

#[test]
fn test_classic_increment_2x3_times_3x2() {
    let a = Matrix::increment(2, 3);
    let b = Matrix::increment(3, 2);

    let c = multiply_classic(&a, &b);

    assert_eq!(c.shape(), (2, 2));
    assert_eq!(c.at(0, 0).unwrap(), 10.0);
    assert_eq!(c.at(0, 1).unwrap(), 13.0);
    assert_eq!(c.at(1, 0).unwrap(), 28.0);
    assert_eq!(c.at(1, 1).unwrap(), 40.0);
}

#[test]
fn test_classic_known_values() {
    let a = Matrix::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    let b = Matrix::from_vec(3, 2, vec![7.0, 8.0, 9.0, 10.0, 11.0, 12.0]).unwrap();

    let c = multiply_classic(&a, &b);
    assert_eq!(c.as_slice(), &[58.0, 64.0, 139.0, 154.0]);
}

#[test]
fn test_transposed_matches_classic() {
    let test_cases = [(1, 1, 1), (2, 3, 2), (4, 4, 4), (5, 7, 3), (13, 17, 19), (32, 8, 64)];

    for (p, q, r) in test_cases {
        let a = patterned(p, q, 10);
        let b = patterned(q, r, 7);

        let classic = multiply_classic(&a, &b);
        let transposed = multiply_transposed(&a, &b.transpose());

        assert_matrices_equal(&classic, &transposed, &format!("transposed_{}x{}x{}", p, q, r));

        let dispatched = matmul::multiply(&a, &b.transpose(), Variant::Transposed);
        assert_matrices_equal(&classic, &dispatched, &format!("dispatch_{}x{}x{}", p, q, r));
    }
}

#[test]
fn test_classic_mismatch_returns_zero_shape() {
    let a = Matrix::increment(2, 3);
    let b = Matrix::increment(2, 5);

    let c = multiply_classic(&a, &b);
    assert_eq!(c.shape(), (2, 5));
    assert!(c.as_slice().iter().all(|&v| v == 0.0));

    match try_multiply_classic(&a, &b) {
        Err(MatmulError::DimensionMismatch {
            variant,
            execution,
            left,
            right,
            output,
        }) => {
            assert_eq!(variant, Variant::Classic);
            assert_eq!(execution, Execution::Sequential);
            assert_eq!(left, (2, 3));
            assert_eq!(right, (2, 5));
            assert_eq!(output, (2, 5));
        }
        other => panic!("expected DimensionMismatch, got {:?}", other),
    }
}

#[test]
fn test_transposed_mismatch_returns_zero_shape() {
    let a = Matrix::increment(2, 3);
    let bt = Matrix::increment(4, 2);

    let c = multiply_transposed(&a, &bt);
    assert_eq!(c.shape(), (2, 4));
    assert!(c.as_slice().iter().all(|&v| v == 0.0));

    let err = try_multiply_transposed(&a, &bt).unwrap_err();
    assert!(err.to_string().contains("Cols of m1 must match Cols of m2t"));
    assert_eq!(err.placeholder().unwrap(), Matrix::zeros(2, 4));
}

// ============================================================
// Parallel engine
// ============================================================

#[test]
fn test_parallel_two_tasks_4x4() {
    let a = Matrix::increment(4, 4);
    let b = Matrix::increment(4, 4);

    let expected = multiply_classic(&a, &b);
    let actual = multiply_parallel(&a, &b, 2, Variant::Classic);

    assert_matrices_equal(&expected, &actual, "parallel_2_tasks_4x4");
}

#[test]
fn test_parallel_matches_sequential_even_splits() {
    // Row half and column count divisible by every task grid used.
    let test_cases = [(8, 4, 8), (16, 16, 16), (32, 7, 24)];

    for (p, q, r) in test_cases {
        let a = patterned(p, q, 13);
        let b = patterned(q, r, 9);
        let bt = b.transpose();
        let expected = multiply_classic(&a, &b);

        for t in [2, 4, 8] {
            let classic = multiply_parallel(&a, &b, t, Variant::Classic);
            assert_matrices_equal(&expected, &classic, &format!("classic_{}x{}x{}_t{}", p, q, r, t));

            let transposed = multiply_parallel(&a, &bt, t, Variant::Transposed);
            assert_matrices_equal(
                &expected,
                &transposed,
                &format!("transposed_{}x{}x{}_t{}", p, q, r, t),
            );
        }
    }
}

#[test]
fn test_parallel_odd_rows_and_column_remainder() {
    let test_cases = [(5, 3, 7), (7, 4, 3), (1, 2, 9), (3, 5, 1), (17, 13, 31)];

    for (p, q, r) in test_cases {
        let a = patterned(p, q, 10);
        let b = patterned(q, r, 10);
        let expected = multiply_classic(&a, &b);

        for t in [2, 4, 6, 8, 10] {
            let actual = try_multiply_parallel(&a, &b, t, Variant::Classic).unwrap();
            assert_matrices_equal(&expected, &actual, &format!("uneven_{}x{}x{}_t{}", p, q, r, t));
        }
    }
}

#[test]
fn test_parallel_large_matches_sequential() {
    let size = 96;
    let a = patterned(size, size, 17);
    let b = patterned(size, size, 13);

    let expected = multiply_classic(&a, &b);
    let actual = multiply_parallel(&a, &b.transpose(), 8, Variant::Transposed);

    assert_matrices_equal(&expected, &actual, "parallel_large");
}

#[test]
fn test_parallel_mismatch_returns_zero_shape() {
    let a = Matrix::increment(4, 3);
    let b = Matrix::increment(4, 4);

    let c = multiply_parallel(&a, &b, 4, Variant::Classic);
    assert_eq!(c.shape(), (4, 4));
    assert!(c.as_slice().iter().all(|&v| v == 0.0));

    assert!(matches!(
        try_multiply_parallel(&a, &b, 4, Variant::Classic),
        Err(MatmulError::DimensionMismatch {
            execution: Execution::Parallel,
            ..
        })
    ));
}

#[test]
fn test_parallel_invalid_task_count() {
    let a = Matrix::increment(4, 4);
    let b = Matrix::increment(4, 4);

    for t in [0, 1, 3] {
        assert!(matches!(
            try_multiply_parallel(&a, &b, t, Variant::Classic),
            Err(MatmulError::InvalidTaskCount(c)) if c == t
        ));

        let c = multiply_parallel(&a, &b, t, Variant::Classic);
        assert_eq!(c, Matrix::zeros(4, 4));
    }
}

#[test]
fn test_dedicated_engine_matches_sequential() {
    let engine = Engine::new(EngineConfig {
        threads: Some(2),
        task_count: 6,
    })
    .unwrap();

    let a = patterned(12, 10, 7);
    let b = patterned(10, 9, 5);

    let expected = multiply_classic(&a, &b);
    assert_matrices_equal(&expected, &engine.multiply(&a, &b, Variant::Classic), "engine_classic");
    assert_matrices_equal(
        &expected,
        &engine.try_multiply(&a, &b.transpose(), Variant::Transposed).unwrap(),
        "engine_transposed",
    );
}

#[test]
fn test_cancellable_without_cancel_completes() {
    let engine = Engine::global(4);
    let token = CancellationToken::new();

    let a = patterned(8, 8, 5);
    let b = patterned(8, 8, 3);

    let c = engine.multiply_cancellable(&a, &b, Variant::Classic, &token).unwrap();
    assert_matrices_equal(&multiply_classic(&a, &b), &c, "cancellable");
}

#[test]
fn test_cancel_is_shared_between_clones() {
    let token = CancellationToken::new();
    let clone = token.clone();
    clone.cancel();
    assert!(token.is_cancelled());

    let a = Matrix::increment(4, 4);
    let result = Engine::global(2).multiply_cancellable(&a, &a, Variant::Classic, &token);
    assert!(matches!(result, Err(MatmulError::Cancelled)));
}

// ============================================================
// Partition
// ============================================================

#[test]
fn test_partition_disjoint_and_complete() {
    for (rows, cols) in [(4, 4), (5, 7), (100, 33)] {
        for t in [2, 4, 8] {
            let blocks = compute_blocks(rows, cols, t).unwrap();
            let mut seen = vec![false; rows * cols];
            for block in &blocks {
                for idx in block.indices(cols) {
                    assert!(!seen[idx], "index {} assigned twice", idx);
                    seen[idx] = true;
                }
            }
            assert!(seen.iter().all(|&s| s), "{}x{} t{} left a gap", rows, cols, t);
        }
    }
}

#[test]
fn test_truncating_partition_leaves_remainder() {
    let blocks = compute_blocks_truncating(4, 6, 8).unwrap();
    // Four column bands of width 1: columns 4 and 5 are never assigned.
    let max_col = blocks.iter().map(|b| b.cols.end).max().unwrap();
    assert_eq!(max_col, 4);
}

// ============================================================
// Double-indexed grid
// ============================================================

#[test]
fn test_grid_matches_linear() {
    for (p, q, r) in [(2, 3, 2), (4, 4, 4), (5, 6, 7)] {
        let ga = Grid::new(p, q, Fill::Increment);
        let gb = Grid::new(q, r, Fill::Increment);

        let expected = multiply_classic(&Matrix::increment(p, q), &Matrix::increment(q, r));

        let seq = Matrix::linearise(&ga.multiply(&gb));
        assert_matrices_equal(&expected, &seq, "grid_sequential");

        let par = Matrix::from(&ga.multiply_parallel(&gb, 4));
        assert_matrices_equal(&expected, &par, "grid_parallel");
    }
}

#[test]
fn test_grid_parallel_mismatch() {
    let ga = Grid::new(3, 2, Fill::Increment);
    let gb = Grid::new(3, 2, Fill::Increment);

    assert!(ga.try_multiply_parallel(&gb, 2).is_err());
    assert_eq!(ga.multiply_parallel(&gb, 2), Grid::new(3, 2, Fill::Zero));
}

// ============================================================
// Display
// ============================================================

#[test]
fn test_display_product() {
    let c = multiply_classic(&Matrix::increment(2, 3), &Matrix::increment(3, 2));
    assert_eq!(c.to_string(), "10 13\n28 40\n");
}

#[test]
fn test_display_large_is_placeholder() {
    let m = Matrix::increment(16, 16);
    let text = m.to_string();
    assert!(text.starts_with("Showing first 5 indexes: 0, 1, 2, 3, 4\n"));
    assert!(text.ends_with("Showing last  5 indexes: 251, 252, 253, 254, 255\n"));
}
