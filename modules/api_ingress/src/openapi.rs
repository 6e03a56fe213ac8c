use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder};

/// Merge per-module documents under one server-wide `info` block.
pub fn build_openapi(modules: impl IntoIterator<Item = OpenApi>) -> OpenApi {
    let mut doc = OpenApiBuilder::new()
        .info(
            InfoBuilder::new()
                .title("EventReg API")
                .version(env!("CARGO_PKG_VERSION"))
                .description(Some("Capacity-bounded event registration service"))
                .build(),
        )
        .build();
    for module in modules {
        doc.merge(module);
    }
    doc
}
