//! Admission → pipeline → playback, as one process-scoped object.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::admission::limiter::AdmissionController;
use crate::config::GiftermConfig;
use crate::foundation::error::{GiftermError, GiftermResult};
use crate::pipeline::pipeline::{Origin, PlayRequest, Pipeline};
use crate::playback::emitter;

/// Built once at startup and shared by every request handler.
#[derive(Debug)]
pub struct Service {
    admission: Arc<AdmissionController>,
    pipeline: Pipeline,
}

impl Service {
    /// Service with a running admission janitor.
    pub fn start(cfg: &GiftermConfig, pipeline: Pipeline) -> GiftermResult<Self> {
        Ok(Self::with_admission(
            AdmissionController::start(&cfg.admission)?,
            pipeline,
        ))
    }

    pub fn with_admission(admission: Arc<AdmissionController>, pipeline: Pipeline) -> Self {
        Self {
            admission,
            pipeline,
        }
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Admit, render and play `req` into `sink`.
    ///
    /// Requests carrying an identity spend one of its tokens; a rejected request writes nothing.
    /// Anonymous requests are not limited. Once admitted, the only possible error is a failing sink.
    pub fn serve<W: Write + ?Sized>(
        &self,
        identity: Option<&str>,
        req: &PlayRequest,
        sink: &mut W,
    ) -> GiftermResult<Origin> {
        self.serve_with(identity, req, sink, std::thread::sleep)
    }

    /// [`Service::serve`] with an injectable playback pacer.
    #[tracing::instrument(skip(self, req, sink, pace))]
    pub fn serve_with<W, P>(
        &self,
        identity: Option<&str>,
        req: &PlayRequest,
        sink: &mut W,
        pace: P,
    ) -> GiftermResult<Origin>
    where
        W: Write + ?Sized,
        P: FnMut(Duration),
    {
        if let Some(identity) = identity
            && !self.admission.check(identity)
        {
            return Err(GiftermError::AdmissionRejected);
        }

        let playback = self.pipeline.run(req);
        emitter::emit_with(&playback.frames, sink, playback.trailing(), pace)?;
        Ok(playback.origin)
    }
}

#[cfg(test)]
#[path = "../tests/unit/service.rs"]
mod tests;
