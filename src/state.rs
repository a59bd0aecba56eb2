use crate::{
    assets::ImageAssets, config::RuntimeConfiguration, data::store::RecordStore,
    error::RosterResult,
};
use maud::{DOCTYPE, Markup, html};

#[derive(Clone, Debug)]
pub struct RosterState {
    store: RecordStore,
    images: ImageAssets,
    config: RuntimeConfiguration,
}

impl RosterState {
    pub async fn new(config: RuntimeConfiguration) -> RosterResult<Self> {
        let store = RecordStore::open(&config.db_config()).await?;
        let images = ImageAssets::new(&config.asset_config());

        Ok(Self {
            store,
            images,
            config,
        })
    }

    #[allow(clippy::unused_self)] //in case self is ever needed :)
    pub fn render(&self, markup: Markup) -> Markup {
        html! {
            (DOCTYPE)
            html {
                head {
                    meta charset="UTF-8" {}
                    meta name="viewport" content="width=device-width, initial-scale=1.0" {}
                    script src="https://unpkg.com/htmx.org@2.0.4" integrity="sha384-HGfztofotfshcF7+8n44JQL2oJmowVChPTg48S+jvZoztPfvwD79OC/LTtG6dMp+" crossorigin="anonymous" {}
                    script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4" {}
                    title { "Roster" }
                }
                body class="bg-gray-900 min-h-screen flex flex-col items-center text-white p-8" {
                    (markup)
                }
            }
        }
    }

    pub const fn store(&self) -> &RecordStore {
        &self.store
    }

    pub const fn images(&self) -> &ImageAssets {
        &self.images
    }

    pub const fn config(&self) -> &RuntimeConfiguration {
        &self.config
    }

    pub async fn sensible_shutdown(&self) {
        self.store.close().await;
        info!("Closed database pool");
    }
}
