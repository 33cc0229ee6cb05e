use std::{io, path::Path};

use log::debug;

use super::{unresolved, with_timeout, Session};
use crate::{
    error::{Error, Result},
    signature::class_to_signature,
    source::PositionLookup,
    spec::{
        method::VariableTableWithGeneric,
        reference_type::MethodsWithGeneric,
        stack_frame::GetValues,
        string_reference,
        thread_reference::Frames,
        virtual_machine::AllClassesWithGeneric,
        JdwpId, ObjectID, Tag, Value,
    },
    transport::{send, Transport},
};

/// Coarse category of a value, for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Boolean,
    String,
    Object,
    Void,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayValue {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    /// A reference that is not dereferenced any further.
    Object(ObjectID),
    Null,
    Void,
}

/// The current value of a local variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableValue {
    pub name: String,
    pub kind: ValueKind,
    pub value: DisplayValue,
}

impl<T: Transport, P: PositionLookup> Session<T, P> {
    /// Reads the value of the local variable `name` in the method enclosing
    /// `file:line`, from the top frame of the current thread.
    pub async fn inspect(&self, name: &str, file: &Path, line: u32) -> Result<VariableValue> {
        let limit = self.config.operation_timeout;
        with_timeout(limit, self.read_variable(name, file, line)).await
    }

    async fn read_variable(&self, name: &str, file: &Path, line: u32) -> Result<VariableValue> {
        let (classes, position) = tokio::try_join!(
            send(&self.transport, &AllClassesWithGeneric),
            self.position_at(file, line),
        )?;
        let signature = class_to_signature(&position.class_name);
        let Some(class) = classes.iter().find(|class| class.signature == signature) else {
            return Err(unresolved(file, line));
        };

        let methods = send(&self.transport, &MethodsWithGeneric::new(class.ref_type.id)).await?;
        let Some(method) = methods
            .iter()
            .find(|method| method.name == position.method_name)
        else {
            return Err(unresolved(file, line));
        };

        let thread = self.state.current_thread;
        let variables = VariableTableWithGeneric::new(class.ref_type.id, method.method_id);
        let top_frame = Frames::new(thread, 0, 1);
        let (table, frames) = tokio::try_join!(
            send(&self.transport, &variables),
            send(&self.transport, &top_frame),
        )?;
        let Some(&(frame, location)) = frames.first() else {
            return Err(Error::NoFrames);
        };

        // a name can be declared more than once in different scopes
        let mut candidates = table.variables.iter().filter(|var| var.name == name);
        let first = candidates.clone().next();
        let Some(variable) = candidates
            .find(|var| var.is_visible_at(location.index))
            .or(first)
        else {
            return Err(Error::UnknownVariable {
                name: name.to_owned(),
                class: position.class_name,
                method: position.method_name,
            });
        };

        let tag = Tag::for_signature(&variable.signature).unwrap_or(Tag::Object);
        debug!("reading {name} from slot {} as {tag:?}", variable.slot);
        let values = send(
            &self.transport,
            &GetValues::new(thread, frame, vec![(variable.slot, tag)]),
        )
        .await?;
        let Some(value) = values.into_iter().next() else {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no value in the reply",
            )));
        };

        if value.tag() != tag {
            debug!("{name} was read as {tag:?} but came back as {:?}", value.tag());
        }
        let (kind, value) = self.present(value).await?;
        Ok(VariableValue {
            name: name.to_owned(),
            kind,
            value,
        })
    }

    async fn present(&self, value: Value) -> Result<(ValueKind, DisplayValue)> {
        use DisplayValue as D;

        let presented = match value {
            Value::Byte(v) => (ValueKind::Number, D::Integer(v.into())),
            Value::Char(v) => (ValueKind::Number, D::Integer(v.into())),
            Value::Short(v) => (ValueKind::Number, D::Integer(v.into())),
            Value::Int(v) => (ValueKind::Number, D::Integer(v.into())),
            Value::Long(v) => (ValueKind::Number, D::Integer(v)),
            Value::Float(v) => (ValueKind::Number, D::Float(v.into())),
            Value::Double(v) => (ValueKind::Number, D::Float(v)),
            Value::Boolean(v) => (ValueKind::Boolean, D::Boolean(v)),
            Value::Void => (ValueKind::Void, D::Void),
            Value::String(id) if id.raw() == 0 => (ValueKind::String, D::Null),
            Value::String(id) => {
                let text = send(&self.transport, &string_reference::Value::new(id)).await?;
                (ValueKind::String, D::Text(text))
            }
            Value::Object(id)
            | Value::Array(id)
            | Value::ThreadGroup(id)
            | Value::ClassLoader(id)
            | Value::ClassObject(id) => (ValueKind::Object, object(id)),
            Value::Thread(id) => (ValueKind::Object, object(id.into())),
        };
        Ok(presented)
    }
}

fn object(id: ObjectID) -> DisplayValue {
    if id.raw() == 0 {
        DisplayValue::Null
    } else {
        DisplayValue::Object(id)
    }
}
