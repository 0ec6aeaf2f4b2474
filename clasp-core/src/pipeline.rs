use crate::{
    ArrayHandle, Connection, CursorHandle, Fault, LobHandle, ParamType, ParamValue,
    ParameterStore, Result, Value,
};
use log::warn;

/// The three phase per statement value coercion protocol.
///
/// `pre_convert` runs right before execution and turns host representations
/// of container typed entries into driver native handles, `release` frees the
/// temporaries the pipeline created once the statement has run, and
/// `post_convert` drains native handles coming back out of the statement into
/// host values. Template, ordering and conversion problems abort the call,
/// release problems never do: by the time release runs the statement has
/// already executed and its results are valid.
pub trait Coercion {
    fn pre_convert(
        &self,
        connection: &mut dyn Connection,
        store: &ParameterStore,
    ) -> Result<ParameterStore>;

    fn release(
        &self,
        connection: &mut dyn Connection,
        converted: &ParameterStore,
        original: &ParameterStore,
    );

    fn post_convert(&self, store: &ParameterStore) -> Result<ParameterStore>;

    /// List form of [`post_convert`](Self::post_convert). The header row at
    /// index 0 carries call metadata, is never coerced and is copied through
    /// untouched.
    fn post_convert_rows(&self, rows: &[ParameterStore]) -> Result<Vec<ParameterStore>> {
        let mut result = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            if i == 0 {
                result.push(row.clone());
            } else {
                result.push(self.post_convert(row)?);
            }
        }
        Ok(result)
    }
}

/// The default policy: builds native containers for ARRAY/BLOB/CLOB/XML
/// entries before execution and drains them back afterwards.
#[derive(Default, Debug, Clone, Copy)]
pub struct ConvertingPipeline;

impl ConvertingPipeline {
    pub fn new() -> Self {
        Self
    }

    /// Registration point for a backend profile. A backend that cannot free
    /// the temporary containers it hands out is rejected here, once, instead
    /// of leaking silently on every call.
    pub fn for_connection(connection: &dyn Connection) -> Result<Self> {
        if !connection.supports_release() {
            return Err(Fault::conversion(
                "the backend does not expose a release operation for temporary containers",
            ));
        }
        Ok(Self)
    }
}

impl Coercion for ConvertingPipeline {
    fn pre_convert(
        &self,
        connection: &mut dyn Connection,
        store: &ParameterStore,
    ) -> Result<ParameterStore> {
        let mut converted = store.clone();
        for entry in converted.iter_mut() {
            if !entry.ty.is_container() {
                continue;
            }
            // Typed NULLs and caller supplied native handles pass through.
            if entry.value.is_native() {
                continue;
            }
            if entry.value.as_host().is_some_and(Value::is_null) {
                continue;
            }
            entry.value = match entry.ty {
                ParamType::Array => {
                    let elements = match &entry.value {
                        ParamValue::Host(Value::List(Some(elements))) => elements.clone(),
                        _ => {
                            return Err(unconvertible(entry.ty, &entry.name));
                        }
                    };
                    ParamValue::Array(ArrayHandle::new(connection.create_array(elements)?))
                }
                ParamType::Blob => {
                    let lob = LobHandle::new(connection.create_blob()?);
                    lob.write(&host_bytes(entry.ty, &entry.name, &entry.value)?)?;
                    ParamValue::Blob(lob)
                }
                ParamType::Clob => {
                    let lob = LobHandle::new(connection.create_clob()?);
                    lob.write(&host_bytes(entry.ty, &entry.name, &entry.value)?)?;
                    ParamValue::Clob(lob)
                }
                ParamType::Xml => {
                    let lob = LobHandle::new(connection.create_xml()?);
                    lob.write(&host_bytes(entry.ty, &entry.name, &entry.value)?)?;
                    ParamValue::Xml(lob)
                }
                ParamType::Scalar | ParamType::Cursor => continue,
            };
        }
        Ok(converted)
    }

    fn release(
        &self,
        _connection: &mut dyn Connection,
        converted: &ParameterStore,
        original: &ParameterStore,
    ) {
        for entry in converted.iter() {
            if !entry.ty.is_container() {
                continue;
            }
            // A handle the caller supplied directly is caller owned.
            if original
                .entry_by_position(entry.position)
                .is_some_and(|e| e.value.is_native())
            {
                continue;
            }
            let freed = match &entry.value {
                ParamValue::Array(handle) => handle.free(),
                ParamValue::Blob(handle) | ParamValue::Clob(handle) | ParamValue::Xml(handle) => {
                    handle.free()
                }
                _ => continue,
            };
            if let Err(e) = freed {
                warn!(
                    "could not release the temporary container of parameter `{}`: {:#}",
                    entry.name, e,
                );
            }
        }
    }

    fn post_convert(&self, store: &ParameterStore) -> Result<ParameterStore> {
        let mut converted = store.clone();
        for entry in converted.iter_mut() {
            let drained = match &entry.value {
                ParamValue::Array(handle) => handle
                    .elements()
                    .map(|elements| ParamValue::Host(Value::List(Some(elements))))
                    .inspect(|_| free_quietly(&entry.name, handle.free())),
                ParamValue::Blob(handle) => handle
                    .read_all()
                    .map(|bytes| ParamValue::Host(Value::Blob(Some(bytes))))
                    .inspect(|_| free_quietly(&entry.name, handle.free())),
                ParamValue::Clob(handle) | ParamValue::Xml(handle) => handle
                    .read_all()
                    .and_then(|bytes| {
                        let text = String::from_utf8(bytes.into_vec())?;
                        Ok(ParamValue::Host(Value::Varchar(Some(text))))
                    })
                    .inspect(|_| free_quietly(&entry.name, handle.free())),
                ParamValue::Cursor(handle) => drain_rows(handle)
                    .map(ParamValue::Rows)
                    .inspect(|_| free_quietly(&entry.name, handle.close())),
                _ => continue,
            };
            match drained {
                Ok(value) => entry.value = value,
                // Keep the original value, the rows already obtained by the
                // call stay valid regardless.
                Err(e) => warn!(
                    "could not drain the container of parameter `{}`, keeping it as is: {:#}",
                    entry.name, e,
                ),
            }
        }
        Ok(converted)
    }
}

fn drain_rows(handle: &CursorHandle) -> Result<Vec<ParameterStore>> {
    let mut rows = Vec::new();
    while let Some(row) = handle.next_row()? {
        rows.push(row);
    }
    Ok(rows)
}

fn free_quietly(name: &str, outcome: Result<()>) {
    if let Err(e) = outcome {
        warn!(
            "could not release the drained container of parameter `{}`: {:#}",
            name, e,
        );
    }
}

fn unconvertible(ty: ParamType, name: &str) -> crate::Error {
    Fault::conversion(format!(
        "the value of parameter `{}` has no supported conversion to {:?}",
        name, ty,
    ))
}

fn host_bytes(ty: ParamType, name: &str, value: &ParamValue) -> Result<Box<[u8]>> {
    match value {
        ParamValue::Host(host) => host
            .as_bytes()
            .map(Into::into)
            .ok_or_else(|| unconvertible(ty, name)),
        ParamValue::Stream(source) => source.read_all(),
        _ => Err(unconvertible(ty, name)),
    }
}

/// Identity policy for callers that already exchange driver native values
/// directly: no conversion, no release, values are never mutated.
#[derive(Default, Debug, Clone, Copy)]
pub struct PassthroughPipeline;

impl PassthroughPipeline {
    pub fn new() -> Self {
        Self
    }
}

impl Coercion for PassthroughPipeline {
    fn pre_convert(
        &self,
        _connection: &mut dyn Connection,
        store: &ParameterStore,
    ) -> Result<ParameterStore> {
        Ok(store.clone())
    }

    fn release(
        &self,
        _connection: &mut dyn Connection,
        _converted: &ParameterStore,
        _original: &ParameterStore,
    ) {
    }

    fn post_convert(&self, store: &ParameterStore) -> Result<ParameterStore> {
        Ok(store.clone())
    }
}
