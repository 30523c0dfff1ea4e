use std::sync::Arc;

use serde_json::json;
use zarrs_overlay::{
    consolidate::{consolidate_edits, fetch_consolidated_metadata, UploadValue},
    hierarchy::{BaseGroupTraits, DatasetData, DatasetDataOptions, StoreGroup},
    metadata::Attributes,
    overlay::EditSession,
    storage::{store::MemoryStore, ReadableStorageTraits, StoreKey, WritableStorageTraits},
};

fn attrs(value: serde_json::Value) -> Attributes {
    value.as_object().unwrap().clone()
}

fn base_store() -> Result<Arc<MemoryStore>, Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    store.set(
        &StoreKey::new(".zmetadata")?,
        serde_json::to_vec(&json!({
            "zarr_consolidated_format": 1,
            "metadata": {
                ".zgroup": {"zarr_format": 2},
                "data/.zgroup": {"zarr_format": 2},
                "data/x/.zarray": {
                    "zarr_format": 2, "shape": [3], "chunks": [3], "dtype": "<i4",
                    "compressor": null, "fill_value": 0, "order": "C", "filters": null
                },
            },
        }))?
        .into(),
    )?;
    store.set(
        &StoreKey::new("data/x/0")?,
        DatasetData::Int32(vec![7, 8, 9]).to_le_bytes().into(),
    )?;
    Ok(store)
}

#[test]
fn upload_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let store = base_store()?;
    let session = EditSession::new(Arc::new(StoreGroup::open(store.clone())?));

    let root = session.root();
    root.set_attrs(attrs(json!({"title": "figure"})))?;
    root.create_group("views", attrs(json!({"kind": "views"})))?;
    let data = root.get_group("data")?.unwrap();
    data.create_dataset(
        "y",
        DatasetData::Float64(vec![0.5, 1.5, 2.5, 3.5]),
        vec![2, 2],
        "float64",
        attrs(json!({"units": "m"})),
    )?;

    let payload = consolidate_edits(&session.edits(), fetch_consolidated_metadata(&*store)?)?;
    assert!(payload.consolidated_metadata().is_some());
    assert!(matches!(
        payload.get(&StoreKey::new("data/y/0.0")?),
        Some(UploadValue::Binary(_))
    ));
    assert!(payload.get(&StoreKey::new(".zattrs")?).is_none());
    payload.store(&*store)?;
    session.clear_edits();

    let reopened = StoreGroup::open(store.clone())?;
    assert_eq!(reopened.attrs(), attrs(json!({"title": "figure"})));
    let views = reopened.get_group("views")?.unwrap();
    assert_eq!(views.attrs(), attrs(json!({"kind": "views"})));

    let data = reopened.get_group("data")?.unwrap();
    let names: Vec<_> = data.datasets().into_iter().map(|d| d.name).collect();
    assert_eq!(names, ["x", "y"]);
    let y = data.get_dataset("y")?.unwrap();
    assert_eq!(y.shape, [2, 2]);
    assert_eq!(y.attrs, attrs(json!({"units": "m"})));
    assert_eq!(
        data.get_dataset_data("y", &DatasetDataOptions::with_slice(vec![1..2, 0..2]))?,
        Some(DatasetData::Float64(vec![2.5, 3.5]))
    );
    assert_eq!(
        data.get_dataset_data("x", &DatasetDataOptions::default())?,
        Some(DatasetData::Int32(vec![7, 8, 9]))
    );

    // the session now reads the uploaded objects from the base
    let session = EditSession::new(Arc::new(reopened));
    assert!(!session.root().get_group("views")?.unwrap().is_virtual());
    Ok(())
}

#[test]
fn upload_removals_not_uploaded() -> Result<(), Box<dyn std::error::Error>> {
    let store = base_store()?;
    let session = EditSession::new(Arc::new(StoreGroup::open(store.clone())?));
    session.root().remove_group("data")?;
    assert!(session.root().subgroups()?.is_empty());

    let payload = consolidate_edits(&session.edits(), fetch_consolidated_metadata(&*store)?)?;
    assert!(payload.is_empty());
    payload.store(&*store)?;

    let reopened = StoreGroup::open(store.clone())?;
    assert_eq!(reopened.subgroups().len(), 1);
    assert!(store.get(&StoreKey::new("data/x/0")?)?.is_some());
    Ok(())
}

#[test]
fn upload_replaces_packed_chunks() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(MemoryStore::new());
    store.set(
        &StoreKey::new(".zmetadata")?,
        serde_json::to_vec(&json!({
            "zarr_consolidated_format": 1,
            "metadata": {
                ".zgroup": {"zarr_format": 2},
                "a/.zarray": {
                    "zarr_format": 2, "shape": [2], "chunks": [2], "dtype": "<i4",
                    "compressor": null, "fill_value": 0, "order": "C", "filters": null
                },
                "b/.zarray": {
                    "zarr_format": 2, "shape": [1], "chunks": [1], "dtype": "|u1",
                    "compressor": null, "fill_value": 0, "order": "C", "filters": null
                },
            },
            "refs": {
                "a/0": ["_consolidated_0.dat", 0, 8],
                "b/0": ["_consolidated_0.dat", 8, 1]
            }
        }))?
        .into(),
    )?;
    let mut packed = DatasetData::Int32(vec![1, 2]).to_le_bytes();
    packed.push(3);
    store.set(&StoreKey::new("_consolidated_0.dat")?, packed.into())?;

    let session = EditSession::new(Arc::new(StoreGroup::open(store.clone())?));
    let root = session.root();
    root.create_dataset("a", DatasetData::Int32(vec![9, 9]), vec![2], "int32", Attributes::new())?;
    assert_eq!(
        session.root().get_dataset_data("a", &DatasetDataOptions::default())?,
        Some(DatasetData::Int32(vec![9, 9]))
    );

    let payload = consolidate_edits(&session.edits(), fetch_consolidated_metadata(&*store)?)?;
    payload.store(&*store)?;

    let reopened = StoreGroup::open(store.clone())?;
    assert_eq!(
        reopened.get_dataset_data("a", &DatasetDataOptions::default())?,
        Some(DatasetData::Int32(vec![9, 9]))
    );
    assert_eq!(
        reopened.get_dataset_data("b", &DatasetDataOptions::default())?,
        Some(DatasetData::UInt8(vec![3]))
    );

    // a created dataset of a different shape over a packed dataset
    let session = EditSession::new(Arc::new(reopened));
    session.root().create_dataset(
        "b",
        DatasetData::UInt8(vec![4, 5, 6]),
        vec![3],
        "uint8",
        Attributes::new(),
    )?;
    let payload = consolidate_edits(&session.edits(), fetch_consolidated_metadata(&*store)?)?;
    payload.store(&*store)?;
    let reopened = StoreGroup::open(store)?;
    assert_eq!(
        reopened.get_dataset_data("b", &DatasetDataOptions::default())?,
        Some(DatasetData::UInt8(vec![4, 5, 6]))
    );
    Ok(())
}
