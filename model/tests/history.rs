use mosaic_core::attribute::{AttributeType, AttributeValue};
use mosaic_core::command::CommandError;
use mosaic_model::commands::{
    AddComponentAttrCmd, AddLayerCmd, AddPropertyCmd, AddRowCmd, AddTilesetCmd,
    AttachComponentCmd, BucketCmd, CreateComponentDefCmd, DuplicateLayerCmd, MoveLayerDownCmd,
    RemoveComponentDefCmd, RemoveLayerCmd, RenameLayerCmd, ResizeMapCmd, SetLayerOpacityCmd,
    SetLayerVisibilityCmd, UpdateAttachedComponentCmd, UpdatePropertyCmd,
};
use mosaic_model::component::{attached_component, component_def_by_name, component_defs};
use mosaic_model::components::{ComponentDef, LayerKind};
use mosaic_model::context::{
    context, context_owner, current_context, root_context_owner, set_active_context,
    snapshot_context,
};
use mosaic_model::layer::{active_layer, copy_layer, find_layer, layer, layer_ids, layer_name};
use mosaic_model::map::{map_size, set_tile, tile_at};
use mosaic_model::snapshot::{ContextSnapshot, LayerSnapshot};
use mosaic_model::tileset::{active_tileset, tileset_count};
use mosaic_model::{
    ContextId, InMemoryTextureLoader, LayerId, MapDocument, Settings, TileId, TilePos, TilesetId,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn document(rows: usize, cols: usize) -> MapDocument {
    init_logging();
    let textures = InMemoryTextureLoader::new().with_texture("tiles/terrain.png", 128, 64);
    MapDocument::new(rows, cols, 32, 32, Box::new(textures)).unwrap()
}

/// Everything observable about a document, for before/after comparisons.
#[derive(Debug, PartialEq)]
struct Fingerprint {
    size: (usize, usize),
    root: ContextSnapshot,
    layers: Vec<LayerSnapshot>,
    components: Vec<ComponentDef>,
    tilesets: usize,
    active_layer: Option<LayerId>,
    current_context: ContextId,
    active_tileset: Option<TilesetId>,
}

fn fingerprint(doc: &MapDocument) -> Fingerprint {
    let world = doc.world();
    Fingerprint {
        size: map_size(world).unwrap(),
        root: snapshot_context(world, root_context_owner(world).unwrap()).unwrap(),
        layers: layer_ids(world)
            .unwrap()
            .into_iter()
            .map(|id| copy_layer(world, id).unwrap())
            .collect(),
        components: component_defs(world).into_iter().cloned().collect(),
        tilesets: tileset_count(world),
        active_layer: active_layer(world).unwrap(),
        current_context: context(world, current_context(world).unwrap()).unwrap().id,
        active_tileset: active_tileset(world).unwrap(),
    }
}

fn root_context(doc: &MapDocument) -> ContextId {
    context(doc.world(), root_context_owner(doc.world()).unwrap()).unwrap().id
}

fn layer_context(doc: &MapDocument, id: LayerId) -> ContextId {
    context(doc.world(), find_layer(doc.world(), id).unwrap()).unwrap().id
}

fn newest_layer(doc: &MapDocument) -> LayerId {
    *layer_ids(doc.world()).unwrap().iter().max().unwrap()
}

// ---------------------------------------------------------------------------
// Undo/redo restores identical state
// ---------------------------------------------------------------------------

#[test]
fn undo_and_redo_walk_through_identical_states() {
    let mut doc = document(5, 5);
    let root = root_context(&doc);
    let mut states = vec![fingerprint(&doc)];

    doc.push(AddLayerCmd::new(LayerKind::Tile)).unwrap();
    states.push(fingerprint(&doc));
    let tiles = newest_layer(&doc);

    doc.push(BucketCmd::new(tiles, TilePos::new(0, 0), TileId(4))).unwrap();
    states.push(fingerprint(&doc));

    doc.push(AddLayerCmd::new(LayerKind::Group)).unwrap();
    states.push(fingerprint(&doc));

    doc.push(DuplicateLayerCmd::new(tiles)).unwrap();
    states.push(fingerprint(&doc));

    doc.push(MoveLayerDownCmd::new(tiles)).unwrap();
    states.push(fingerprint(&doc));

    doc.push(ResizeMapCmd::new(2, 7)).unwrap();
    states.push(fingerprint(&doc));

    doc.push(AddPropertyCmd::new(root, "music", AttributeType::Path)).unwrap();
    states.push(fingerprint(&doc));

    doc.push(CreateComponentDefCmd::new("Spawn")).unwrap();
    states.push(fingerprint(&doc));

    doc.push(AddTilesetCmd::new("tiles/terrain.png", 32, 32)).unwrap();
    states.push(fingerprint(&doc));

    doc.push(RemoveLayerCmd::new(tiles)).unwrap();
    states.push(fingerprint(&doc));

    for expected in states.iter().rev().skip(1) {
        doc.undo().unwrap();
        assert_eq!(&fingerprint(&doc), expected);
    }
    assert!(matches!(doc.undo(), Err(CommandError::NothingToUndo)));

    for expected in states.iter().skip(1) {
        doc.redo().unwrap();
        assert_eq!(&fingerprint(&doc), expected);
    }
    assert!(matches!(doc.redo(), Err(CommandError::NothingToRedo)));
}

#[test]
fn pushing_after_undo_discards_redo_future() {
    let mut doc = document(5, 5);
    doc.push(AddLayerCmd::new(LayerKind::Tile)).unwrap();
    doc.push(AddLayerCmd::new(LayerKind::Object)).unwrap();
    doc.undo().unwrap();
    assert!(doc.can_redo());

    doc.push(AddRowCmd::new()).unwrap();
    assert!(!doc.can_redo());
    assert_eq!(doc.history().len(), 2);
    assert_eq!(doc.undo_text(), Some("Add Row"));
}

// ---------------------------------------------------------------------------
// Clean state
// ---------------------------------------------------------------------------

#[test]
fn clean_state_follows_the_save_point() {
    let mut doc = document(5, 5);
    assert!(doc.is_clean());

    doc.push(AddLayerCmd::new(LayerKind::Tile)).unwrap();
    let id = newest_layer(&doc);
    assert!(!doc.is_clean());
    doc.mark_as_clean();

    doc.push(SetLayerVisibilityCmd::new(id, false)).unwrap();
    assert!(!doc.is_clean());
    doc.undo().unwrap();
    assert!(doc.is_clean());
    doc.undo().unwrap();
    assert!(!doc.is_clean());
    doc.redo().unwrap();
    assert!(doc.is_clean());
}

#[test]
fn discarding_the_saved_state_loses_the_save_point() {
    let mut doc = document(5, 5);
    doc.push(AddLayerCmd::new(LayerKind::Tile)).unwrap();
    let id = newest_layer(&doc);
    doc.push(SetLayerVisibilityCmd::new(id, false)).unwrap();
    doc.mark_as_clean();

    doc.undo().unwrap();
    doc.push(RenameLayerCmd::new(id, "Ground")).unwrap();
    assert!(!doc.is_clean());
    doc.undo().unwrap();
    assert!(!doc.is_clean());

    doc.mark_as_clean();
    assert!(doc.is_clean());
}

#[test]
fn merging_into_the_saved_command_dirties_the_document() {
    let mut doc = document(5, 5);
    doc.push(AddLayerCmd::new(LayerKind::Tile)).unwrap();
    let id = newest_layer(&doc);
    doc.push(SetLayerOpacityCmd::new(id, 0.8)).unwrap();
    doc.mark_as_clean();

    doc.push(SetLayerOpacityCmd::new(id, 0.5)).unwrap();
    assert_eq!(doc.history().len(), 2);
    assert!(!doc.is_clean());
    doc.undo().unwrap();
    assert!(!doc.is_clean());
    assert_eq!(layer(doc.world(), id).unwrap().opacity, 1.0);
}

// ---------------------------------------------------------------------------
// Capacity
// ---------------------------------------------------------------------------

#[test]
fn history_never_exceeds_capacity() {
    let mut doc = document(5, 5);
    doc.set_command_capacity(2);

    for kind in [LayerKind::Tile, LayerKind::Object, LayerKind::Tile] {
        doc.push(AddLayerCmd::new(kind)).unwrap();
        assert!(doc.history().len() <= 2);
    }

    doc.undo().unwrap();
    doc.undo().unwrap();
    assert!(matches!(doc.undo(), Err(CommandError::NothingToUndo)));
    // The evicted first layer stays.
    assert_eq!(layer_ids(doc.world()).unwrap().len(), 1);
    assert_eq!(layer_name(doc.world(), newest_layer(&doc)).unwrap(), "Tile Layer 1");
}

#[test]
fn settings_configure_new_documents() {
    init_logging();
    let settings = Settings::from_toml_str(
        r#"
        command_capacity = 3
        default_rows = 8
        default_columns = 12
        "#,
    )
    .unwrap();
    let mut doc = MapDocument::from_settings(&settings, Box::new(InMemoryTextureLoader::new())).unwrap();
    assert_eq!(map_size(doc.world()).unwrap(), (8, 12));
    assert_eq!(doc.history().capacity(), 3);

    for _ in 0..5 {
        doc.push(AddLayerCmd::new(LayerKind::Tile)).unwrap();
    }
    assert_eq!(doc.history().len(), 3);
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn first_layer_is_named_and_restored_with_its_id() {
    let mut doc = document(5, 5);
    doc.push(AddLayerCmd::new(LayerKind::Tile)).unwrap();
    let id = newest_layer(&doc);
    assert_eq!(layer_name(doc.world(), id).unwrap(), "Tile Layer 1");
    assert_eq!(doc.undo_text(), Some("Add Layer"));

    doc.undo().unwrap();
    assert!(layer_ids(doc.world()).unwrap().is_empty());

    doc.redo().unwrap();
    assert_eq!(layer_ids(doc.world()).unwrap(), vec![id]);
    assert_eq!(layer_name(doc.world(), id).unwrap(), "Tile Layer 1");
}

#[test]
fn shrinking_keeps_cut_tiles_for_every_layer() {
    let mut doc = document(5, 5);
    doc.push(AddLayerCmd::new(LayerKind::Tile)).unwrap();
    let ground = newest_layer(&doc);
    doc.push(AddLayerCmd::new(LayerKind::Tile)).unwrap();
    let decor = newest_layer(&doc);
    set_tile(doc.world_mut(), ground, TilePos::new(4, 4), TileId(7)).unwrap();
    set_tile(doc.world_mut(), decor, TilePos::new(0, 4), TileId(2)).unwrap();

    doc.push(ResizeMapCmd::new(3, 3)).unwrap();
    assert_eq!(map_size(doc.world()).unwrap(), (3, 3));

    doc.undo().unwrap();
    assert_eq!(tile_at(doc.world(), ground, TilePos::new(4, 4)).unwrap(), TileId(7));
    assert_eq!(tile_at(doc.world(), decor, TilePos::new(0, 4)).unwrap(), TileId(2));
    assert_eq!(tile_at(doc.world(), decor, TilePos::new(4, 4)).unwrap(), TileId::EMPTY);
}

#[test]
fn removing_a_definition_cascades_to_layer_contexts() {
    let mut doc = document(5, 5);
    doc.push(AddLayerCmd::new(LayerKind::Object)).unwrap();
    let enemies = layer_context(&doc, newest_layer(&doc));

    doc.push(CreateComponentDefCmd::new("Physics")).unwrap();
    let physics = component_def_by_name(doc.world(), "Physics").unwrap().id;
    doc.push(AddComponentAttrCmd::new(physics, "material")).unwrap();
    doc.push(AttachComponentCmd::new(enemies, physics)).unwrap();
    doc.push(UpdateAttachedComponentCmd::new(enemies, physics, "material", "ice")).unwrap();
    let before = fingerprint(&doc);

    doc.push(RemoveComponentDefCmd::new(physics)).unwrap();
    let owner = context_owner(doc.world(), enemies).unwrap();
    assert!(attached_component(doc.world(), owner, physics).is_err());

    doc.undo().unwrap();
    assert_eq!(fingerprint(&doc), before);
    let owner = context_owner(doc.world(), enemies).unwrap();
    assert_eq!(
        attached_component(doc.world(), owner, physics).unwrap().values["material"],
        AttributeValue::from("ice")
    );
}

#[test]
fn edits_survive_their_target_being_removed_and_restored() {
    let mut doc = document(5, 5);
    doc.push(AddLayerCmd::new(LayerKind::Tile)).unwrap();
    let id = newest_layer(&doc);
    let ctx = layer_context(&doc, id);
    doc.push(AddPropertyCmd::new(ctx, "z", AttributeType::Int)).unwrap();
    doc.push(UpdatePropertyCmd::new(ctx, "z", 3)).unwrap();
    doc.push(RemoveLayerCmd::new(id)).unwrap();

    doc.undo().unwrap();
    doc.undo().unwrap();
    let state = fingerprint(&doc);
    doc.redo().unwrap();
    doc.redo().unwrap();
    doc.undo().unwrap();
    doc.undo().unwrap();
    assert_eq!(fingerprint(&doc), state);
}

#[test]
fn removing_the_active_layer_reselects_it_on_undo() {
    let mut doc = document(5, 5);
    doc.push(AddLayerCmd::new(LayerKind::Tile)).unwrap();
    doc.push(AddLayerCmd::new(LayerKind::Object)).unwrap();
    let objects = newest_layer(&doc);
    let owner = find_layer(doc.world(), objects).unwrap();
    set_active_context(doc.world_mut(), Some(owner)).unwrap();
    let before = fingerprint(&doc);
    assert_eq!(before.active_layer, Some(objects));

    doc.push(RemoveLayerCmd::new(objects)).unwrap();
    assert_eq!(active_layer(doc.world()).unwrap(), None);
    assert_eq!(
        current_context(doc.world()).unwrap(),
        root_context_owner(doc.world()).unwrap()
    );

    doc.undo().unwrap();
    assert_eq!(fingerprint(&doc), before);
    assert_eq!(active_layer(doc.world()).unwrap(), Some(objects));
    assert_eq!(before.current_context, layer_context(&doc, objects));
}

#[test]
fn failed_commands_leave_history_untouched() {
    let mut doc = document(5, 5);
    doc.push(AddLayerCmd::new(LayerKind::Tile)).unwrap();
    let before = fingerprint(&doc);

    assert!(doc.push(RemoveLayerCmd::new(LayerId(99))).is_err());
    assert!(doc.push(AddTilesetCmd::new("tiles/missing.png", 32, 32)).is_err());
    assert!(doc.push(ResizeMapCmd::new(0, 4)).is_err());

    assert_eq!(doc.history().len(), 1);
    assert_eq!(fingerprint(&doc), before);
    assert_eq!(active_tileset(doc.world()).unwrap(), None);
}
