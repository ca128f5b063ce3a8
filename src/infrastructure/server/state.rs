use crate::application::Orchestrator;
use crate::infrastructure::cad::CadClient;
use crate::infrastructure::images::ImageSearchClient;
use crate::infrastructure::model::ModelProvider;
use crate::infrastructure::neows::NeoWsClient;
use std::sync::Arc;

pub(crate) struct ServerState<P: ModelProvider> {
    orchestrator: Orchestrator<P, CadClient>,
    cad: Arc<CadClient>,
    images: Arc<ImageSearchClient>,
    neows: Arc<NeoWsClient>,
}

impl<P: ModelProvider> ServerState<P> {
    pub(crate) fn new(
        orchestrator: Orchestrator<P, CadClient>,
        cad: Arc<CadClient>,
        images: Arc<ImageSearchClient>,
        neows: Arc<NeoWsClient>,
    ) -> Self {
        Self {
            orchestrator,
            cad,
            images,
            neows,
        }
    }

    pub(crate) fn orchestrator(&self) -> &Orchestrator<P, CadClient> {
        &self.orchestrator
    }

    pub(crate) fn cad(&self) -> &CadClient {
        &self.cad
    }

    pub(crate) fn images(&self) -> &ImageSearchClient {
        &self.images
    }

    pub(crate) fn neows(&self) -> &NeoWsClient {
        &self.neows
    }
}
