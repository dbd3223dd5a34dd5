use std::thread;

use crossbeam_channel::{Receiver, Sender};

use super::{GesturePipeline, stats::FrameRateMeter};
use crate::types::{FrameOutput, LandmarkFrame};

/// How frames travel from the source to the pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameDelivery {
    /// Every frame, in order. Suits recorded input.
    #[default]
    InOrder,
    /// Skip to the newest queued frame. Suits a live detector where latency matters.
    LatestOnly,
}

/// Rejects frames whose timestamp does not strictly increase.
#[derive(Clone, Debug, Default)]
pub struct FrameOrderGuard {
    last: Option<u64>,
}

impl FrameOrderGuard {
    pub fn accept(&mut self, timestamp_ms: u64) -> bool {
        if self.last.is_some_and(|last| timestamp_ms <= last) {
            return false;
        }
        self.last = Some(timestamp_ms);
        true
    }
}

pub fn start_pipeline(
    pipeline: GesturePipeline,
    frame_rx: Receiver<LandmarkFrame>,
    output_tx: Sender<FrameOutput>,
    delivery: FrameDelivery,
) -> thread::JoinHandle<()> {
    thread::spawn(move || run_pipeline_loop(pipeline, frame_rx, output_tx, delivery))
}

fn run_pipeline_loop(
    mut pipeline: GesturePipeline,
    frame_rx: Receiver<LandmarkFrame>,
    output_tx: Sender<FrameOutput>,
    delivery: FrameDelivery,
) {
    log::info!(
        "gesture pipeline started with {} hand slots ({:?} smoothing)",
        pipeline.config().max_hands,
        pipeline.config().smoothing.strategy
    );

    let mut order = FrameOrderGuard::default();
    let mut meter = FrameRateMeter::new();

    while let Some(frame) = next_frame(&frame_rx, delivery) {
        if !order.accept(frame.timestamp_ms) {
            log::warn!("dropping out-of-order frame at {}ms", frame.timestamp_ms);
            continue;
        }
        if let Some(fps) = meter.record(frame.timestamp_ms) {
            log::debug!("pipeline input rate {fps:.1} fps");
        }

        let output = pipeline.process_frame(&frame);
        if output_tx.send(output).is_err() {
            break;
        }
    }

    log::info!("gesture pipeline stopped after {} frames", meter.frames());
}

fn next_frame(
    frame_rx: &Receiver<LandmarkFrame>,
    delivery: FrameDelivery,
) -> Option<LandmarkFrame> {
    match delivery {
        FrameDelivery::InOrder => frame_rx.recv().ok(),
        FrameDelivery::LatestOnly => recv_latest_frame(frame_rx),
    }
}

fn recv_latest_frame(frame_rx: &Receiver<LandmarkFrame>) -> Option<LandmarkFrame> {
    let mut frame = frame_rx.recv().ok()?;
    while let Ok(newer) = frame_rx.try_recv() {
        frame = newer;
    }
    Some(frame)
}
