use anyhow::Context;

use shelfplan_api::app::{build_api, dto};
use shelfplan_api::context::RequestContext;
use shelfplan_core::UserId;
use shelfplan_infra::LayoutConfig;

fn id_of(value: &serde_json::Value) -> anyhow::Result<String> {
    value["id"]
        .as_str()
        .map(str::to_string)
        .context("payload has no id")
}

fn print(label: &str, value: &serde_json::Value) -> anyhow::Result<()> {
    println!("# {label}\n{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn product(name: &str, is_own_company: bool) -> dto::RegisterProductRequest {
    dto::RegisterProductRequest {
        name: name.to_string(),
        jan_code: None,
        manufacturer: if is_own_company { "House Brand" } else { "Rival Foods" }.to_string(),
        is_own_company,
        width: 10.0,
        height: 20.0,
        depth: 8.0,
        min_faces: Some(1),
        max_faces: Some(6),
        recommended_faces: Some(3),
    }
}

fn main() -> anyhow::Result<()> {
    shelfplan_observability::init();

    let api = build_api(LayoutConfig::from_env());
    let ctx = RequestContext::new(UserId::new());

    let layout = api.create_shelf(
        &ctx,
        dto::CreateShelfRequest {
            name: "Demo gondola".to_string(),
            width: 120.0,
            depth: 45.0,
            location: "Aisle 1".to_string(),
            description: String::new(),
            segment_heights: vec![30.0],
        },
    )?;
    print("shelf", &layout)?;

    let shelf_id = id_of(&layout["shelf"])?;
    let segment_id = id_of(&layout["segments"][0])?;
    let p1 = id_of(&api.register_product(&ctx, product("P1", true))?)?;
    let p2 = id_of(&api.register_product(&ctx, product("P2", false))?)?;

    let place = |product_id: &str, x_position: f64, face_count: u32| {
        api.place(
            &ctx,
            dto::PlaceRequest {
                shelf_id: shelf_id.clone(),
                segment_id: segment_id.clone(),
                product_id: product_id.to_string(),
                x_position,
                face_count,
            },
        )
    };

    print("P1 at x=0, 5 faces", &place(&p1, 0.0, 5)?)?;
    print("P2 at x=50, 5 faces (flush)", &place(&p2, 50.0, 5)?)?;

    match place(&p1, 40.0, 1) {
        Ok(unexpected) => print("third placement (unexpectedly accepted)", &unexpected)?,
        Err(rejected) => print("third placement at x=40 rejected", &serde_json::to_value(&rejected)?)?,
    }

    print("summary", &api.shelf_summary(&shelf_id)?)?;
    Ok(())
}
