use std::collections::HashMap;

use rayon::prelude::*;

use crate::foundation::error::{ChoreoError, ChoreoResult};
use crate::render::backend::{FrameRGBA, RasterBackend, RenderSettings};
use crate::render::cpu::CpuBackend;
use crate::render::display::Frame;
use crate::render::fingerprint::{FrameFingerprint, fingerprint_frame};

#[derive(Clone, Debug)]
pub struct RenderThreading {
    pub parallel: bool,
    pub chunk_size: usize,
    pub threads: Option<usize>,
    /// Render each distinct display list once and reuse the pixels for repeats.
    pub static_frame_elision: bool,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
            static_frame_elision: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub frames_total: u64,
    pub frames_rendered: u64,
    pub frames_elided: u64,
}

impl RenderStats {
    fn add(&mut self, other: RenderStats) {
        self.frames_total += other.frames_total;
        self.frames_rendered += other.frames_rendered;
        self.frames_elided += other.frames_elided;
    }
}

/// Rasterize buffered display lists in order, handing each result to `on_frame`.
///
/// Parallel mode spawns one [`CpuBackend`] per worker from the backend's worker settings and
/// works through `chunk_size` frames at a time so memory stays bounded.
#[tracing::instrument(skip_all, fields(frames = frames.len(), parallel = threading.parallel))]
pub fn render_frames_with_stats(
    frames: &[Frame],
    backend: &mut dyn RasterBackend,
    threading: &RenderThreading,
    mut on_frame: impl FnMut(FrameRGBA) -> ChoreoResult<()>,
) -> ChoreoResult<RenderStats> {
    let mut stats = RenderStats::default();
    if !threading.parallel {
        for frame in frames {
            on_frame(backend.render_frame(frame)?)?;
            stats.frames_total += 1;
            stats.frames_rendered += 1;
        }
        return Ok(stats);
    }

    let worker_settings = backend.worker_render_settings().ok_or_else(|| {
        ChoreoError::render("parallel render requires backend worker settings support (CpuBackend)")
    })?;
    let pool = build_thread_pool(threading.threads)?;
    for chunk in frames.chunks(threading.chunk_size.max(1)) {
        let (rendered, chunk_stats) =
            render_chunk_parallel_cpu(chunk, &worker_settings, threading, &pool)?;
        for frame in rendered {
            on_frame(frame)?;
        }
        stats.add(chunk_stats);
    }
    tracing::debug!(
        rendered = stats.frames_rendered,
        elided = stats.frames_elided,
        "parallel render done"
    );
    Ok(stats)
}

/// Collecting form of [`render_frames_with_stats`].
pub fn render_frames(
    frames: &[Frame],
    backend: &mut dyn RasterBackend,
    threading: &RenderThreading,
) -> ChoreoResult<Vec<FrameRGBA>> {
    let mut out = Vec::with_capacity(frames.len());
    render_frames_with_stats(frames, backend, threading, |f| {
        out.push(f);
        Ok(())
    })?;
    Ok(out)
}

fn render_chunk_parallel_cpu(
    frames: &[Frame],
    settings: &RenderSettings,
    threading: &RenderThreading,
    pool: &rayon::ThreadPool,
) -> ChoreoResult<(Vec<FrameRGBA>, RenderStats)> {
    let mut unique_indices = Vec::<usize>::with_capacity(frames.len());
    let mut frame_to_unique = Vec::<usize>::with_capacity(frames.len());
    if threading.static_frame_elision {
        let mut first = HashMap::<FrameFingerprint, usize>::new();
        for (idx, frame) in frames.iter().enumerate() {
            let fp = fingerprint_frame(frame);
            if let Some(existing) = first.get(&fp).copied() {
                frame_to_unique.push(existing);
            } else {
                let slot = unique_indices.len();
                unique_indices.push(idx);
                first.insert(fp, slot);
                frame_to_unique.push(slot);
            }
        }
    } else {
        for idx in 0..frames.len() {
            frame_to_unique.push(idx);
            unique_indices.push(idx);
        }
    }

    let rendered = pool.install(|| {
        unique_indices
            .par_iter()
            .map_init(
                || CpuBackend::new(settings.clone()),
                |worker, idx| worker.render_frame(&frames[*idx]),
            )
            .collect::<Vec<_>>()
    });

    let mut unique_frames = Vec::<Option<FrameRGBA>>::with_capacity(rendered.len());
    for item in rendered {
        unique_frames.push(Some(item?));
    }

    let mut remaining = vec![0usize; unique_frames.len()];
    for &u in &frame_to_unique {
        remaining[u] += 1;
    }

    let mut out = Vec::<FrameRGBA>::with_capacity(frame_to_unique.len());
    for u in frame_to_unique {
        let frame = if remaining[u] == 1 {
            unique_frames[u].take()
        } else {
            unique_frames[u].clone()
        };
        out.push(frame.ok_or_else(|| ChoreoError::render("rendered frame missing for reuse"))?);
        remaining[u] -= 1;
    }

    let total = frames.len() as u64;
    let rendered_count = unique_indices.len() as u64;
    Ok((
        out,
        RenderStats {
            frames_total: total,
            frames_rendered: rendered_count,
            frames_elided: total.saturating_sub(rendered_count),
        },
    ))
}

fn build_thread_pool(threads: Option<usize>) -> ChoreoResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(ChoreoError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ChoreoError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
