//! Block-parallel multiplication over a rayon worker pool.

use std::marker::PhantomData;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};

use rayon::{Scope, ThreadPool, ThreadPoolBuilder};

use super::cancel::CancellationToken;
use super::partition::compute_blocks;
use crate::error::{Execution, MatmulError, Result};
use crate::matrix::Matrix;
use crate::sequential::{Dims, Variant, check_shapes, soften};

/// Default number of units a product is split into.
pub const DEFAULT_TASK_COUNT: usize = 8;

/// Output buffer shared by every unit of one call.
///
/// Units write through a raw pointer, each into its own block, so no two
/// units ever touch the same element.
pub(crate) struct SharedOutput<'a> {
    ptr: *mut f32,
    len: usize,
    _buf: PhantomData<&'a mut [f32]>,
}

unsafe impl Send for SharedOutput<'_> {}
unsafe impl Sync for SharedOutput<'_> {}

impl<'a> SharedOutput<'a> {
    fn new(buf: &'a mut [f32]) -> Self {
        Self {
            ptr: buf.as_mut_ptr(),
            len: buf.len(),
            _buf: PhantomData,
        }
    }

    /// # Safety
    ///
    /// `idx` must lie inside the block owned by the calling unit, so that no
    /// other unit writes it concurrently.
    #[inline]
    pub(crate) unsafe fn write(&self, idx: usize, value: f32) {
        debug_assert!(idx < self.len, "output index {} out of bounds ({})", idx, self.len);
        unsafe { *self.ptr.add(idx) = value };
    }
}

/// Computes one rectangle of a product into a [`SharedOutput`].
///
/// Implementations must only write indices `i * n + j` with `i` in `rows`
/// and `j` in `cols`.
pub(crate) trait BlockKernel: Sync {
    fn compute(&self, rows: Range<usize>, cols: Range<usize>, out: &SharedOutput<'_>);
}

/// Linear-buffer kernel for either multiplication variant.
struct LinearKernel<'a> {
    variant: Variant,
    a: &'a [f32],
    b: &'a [f32],
    dims: Dims,
}

impl BlockKernel for LinearKernel<'_> {
    fn compute(&self, rows: Range<usize>, cols: Range<usize>, out: &SharedOutput<'_>) {
        self.variant
            .run_block(self.a, self.b, self.dims, rows, cols, |idx, v| unsafe {
                // SAFETY: the block kernels only emit indices of `rows × cols`.
                out.write(idx, v)
            });
    }
}

/// Worker pool settings for an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Worker threads; `None` lets rayon pick (one per logical CPU).
    pub threads: Option<usize>,
    /// Units each product is split into. Must be even and at least 2.
    pub task_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            threads: None,
            task_count: DEFAULT_TASK_COUNT,
        }
    }
}

/// Splits a product into a `2 × (task_count / 2)` grid of blocks and
/// computes every block as its own unit of work on a rayon pool.
///
/// The call returns only after every unit has finished.
pub struct Engine {
    pool: Option<ThreadPool>,
    task_count: usize,
}

impl Engine {
    /// Engine with a dedicated pool built from `config`.
    pub fn new(config: EngineConfig) -> Result<Self> {
        super::partition::half_tasks(config.task_count)?;

        let mut builder =
            ThreadPoolBuilder::new().thread_name(|i| format!("matmul-worker-{}", i));
        if let Some(threads) = config.threads {
            builder = builder.num_threads(threads);
        }
        let pool = builder.build()?;

        log::debug!(
            "built worker pool with {} threads, {} tasks per product",
            pool.current_num_threads(),
            config.task_count
        );

        Ok(Self {
            pool: Some(pool),
            task_count: config.task_count,
        })
    }

    /// Engine that dispatches onto rayon's global pool.
    ///
    /// The task count is validated on each call, not here.
    pub fn global(task_count: usize) -> Self {
        Self {
            pool: None,
            task_count,
        }
    }

    pub fn task_count(&self) -> usize {
        self.task_count
    }

    /// Worker threads available to this engine.
    pub fn num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// `m1 * right` under `variant`, where `right` is the plain right operand
    /// for [`Variant::Classic`] and its transpose for [`Variant::Transposed`].
    pub fn try_multiply(&self, m1: &Matrix, right: &Matrix, variant: Variant) -> Result<Matrix> {
        self.multiply_inner(m1, right, variant, None)
    }

    /// Like [`Engine::try_multiply`], but a mismatch or invalid task count is
    /// logged and answered with a zero matrix of the intended output shape.
    pub fn multiply(&self, m1: &Matrix, right: &Matrix, variant: Variant) -> Matrix {
        soften(
            self.try_multiply(m1, right, variant),
            variant.output_shape(m1, right),
        )
    }

    /// Like [`Engine::try_multiply`], but every unit stops at its next row
    /// once `token` is cancelled.
    ///
    /// Fails with [`MatmulError::Cancelled`] only if some unit actually
    /// skipped rows. A token cancelled after every unit has finished leaves
    /// the complete product intact and it is returned.
    pub fn multiply_cancellable(
        &self,
        m1: &Matrix,
        right: &Matrix,
        variant: Variant,
        token: &CancellationToken,
    ) -> Result<Matrix> {
        self.multiply_inner(m1, right, variant, Some(token))
    }

    fn multiply_inner(
        &self,
        m1: &Matrix,
        right: &Matrix,
        variant: Variant,
        cancel: Option<&CancellationToken>,
    ) -> Result<Matrix> {
        let dims = check_shapes(variant, Execution::Parallel, m1, right)?;

        let kernel = LinearKernel {
            variant,
            a: m1.as_slice(),
            b: right.as_slice(),
            dims,
        };

        let c = self.run_partitioned(dims.m, dims.n, cancel, &kernel)?;
        Ok(Matrix::from_parts(dims.m, dims.n, c))
    }

    /// Compute an `m × n` output by running `kernel` once per block, each
    /// block on its own unit of work, and wait for all of them.
    pub(crate) fn run_partitioned<K>(
        &self,
        m: usize,
        n: usize,
        cancel: Option<&CancellationToken>,
        kernel: &K,
    ) -> Result<Vec<f32>>
    where
        K: BlockKernel,
    {
        let blocks = compute_blocks(m, n, self.task_count)?;
        let mut c = vec![0.0f32; m * n];

        log::debug!(
            "dispatching {}x{} product as {} blocks",
            m,
            n,
            blocks.len()
        );

        let stopped_early = AtomicBool::new(false);

        {
            let out = SharedOutput::new(&mut c);
            let out = &out;
            let stopped_early = &stopped_early;

            self.scope(|s| {
                for block in &blocks {
                    if block.is_empty() {
                        continue;
                    }

                    s.spawn(move |_| {
                        log::trace!(
                            "task {} computing rows {:?} cols {:?}",
                            block.task,
                            block.rows,
                            block.cols
                        );

                        for i in block.rows.clone() {
                            if cancel.is_some_and(CancellationToken::is_cancelled) {
                                log::trace!("task {} stopped at row {}", block.task, i);
                                stopped_early.store(true, Ordering::Relaxed);
                                return;
                            }
                            kernel.compute(i..i + 1, block.cols.clone(), out);
                        }
                    });
                }
            });
        }

        // The scope join orders every unit's store before this load.
        if stopped_early.load(Ordering::Relaxed) {
            return Err(MatmulError::Cancelled);
        }

        Ok(c)
    }

    fn scope<'scope, OP>(&self, op: OP)
    where
        OP: FnOnce(&Scope<'scope>) + Send,
    {
        match &self.pool {
            Some(pool) => pool.scope(op),
            None => rayon::scope(op),
        }
    }
}

/// `m1 * right` split into `task_count` blocks on rayon's global pool.
///
/// Fails before spawning anything if the shapes do not fit `variant` or if
/// `task_count` is odd or below two.
pub fn try_multiply_parallel(
    m1: &Matrix,
    right: &Matrix,
    task_count: usize,
    variant: Variant,
) -> Result<Matrix> {
    Engine::global(task_count).try_multiply(m1, right, variant)
}

/// Soft-failing [`try_multiply_parallel`]: errors are logged and a zero
/// matrix of the intended output shape is returned.
pub fn multiply_parallel(m1: &Matrix, right: &Matrix, task_count: usize, variant: Variant) -> Matrix {
    Engine::global(task_count).multiply(m1, right, variant)
}
