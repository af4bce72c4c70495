use crate::json::value::error::{PointerError, PointerErrorKind, Unresolvable};
use crate::json::value::pointer::{self, Pointer};
use crate::json::value::{Map, Value};
use log::trace;

/// Where an array reference token points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Index(usize),
    /// `-`, the nonexistent element after the last one.
    Append,
}

/// A handle to a location inside a document, produced by resolving one reference token against
/// the container it was applied to.
///
/// `add`, `replace` and `remove` never touch the container they refer to; they return a rebuilt
/// copy of it. Untouched members and elements are shared with the original.
///
/// `pos` is the offset of the reference token in the pointer text and ends up in the errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference<'a, 'p> {
    Root(&'a Value),
    Member {
        object: &'a Map,
        name: &'p str,
        pos: usize,
    },
    Element {
        array: &'a [Value],
        position: Position,
        pos: usize,
    },
}

impl<'a, 'p> Reference<'a, 'p> {
    pub fn get(&self) -> Result<&'a Value, PointerError> {
        match *self {
            Reference::Root(root) => Ok(root),
            Reference::Member { object, name, pos } => {
                object.get(name).ok_or_else(|| missing_member(name, pos))
            }
            Reference::Element {
                array,
                position,
                pos,
            } => match position {
                Position::Index(index) if index < array.len() => Ok(&array[index]),
                _ => Err(out_of_range(position, array.len(), pos)),
            },
        }
    }

    // for members: inserts the member if it does not exist, existing members keep their position
    // for elements: index == len is allowed, the value is appended
    pub fn add(&self, value: Value) -> Result<Value, PointerError> {
        match *self {
            Reference::Root(_) => assign_root(value),
            Reference::Member { object, name, .. } => {
                let mut map = object.clone();
                map.insert(name.to_string(), value);
                Ok(Value::from(map))
            }
            Reference::Element {
                array,
                position,
                pos,
            } => {
                let index = match position {
                    Position::Index(index) if index <= array.len() => index,
                    Position::Index(_) => return Err(out_of_range(position, array.len(), pos)),
                    Position::Append => array.len(),
                };
                let mut values = Vec::with_capacity(array.len() + 1);
                values.extend_from_slice(&array[..index]);
                values.push(value);
                values.extend_from_slice(&array[index..]);
                Ok(Value::from(values))
            }
        }
    }

    // the difference with add is that the target location must exist
    pub fn replace(&self, value: Value) -> Result<Value, PointerError> {
        match *self {
            Reference::Root(_) => assign_root(value),
            Reference::Member { object, name, pos } => {
                let mut map = object.clone();
                match map.get_mut(name) {
                    Some(slot) => *slot = value,
                    None => return Err(missing_member(name, pos)),
                }
                Ok(Value::from(map))
            }
            Reference::Element {
                array,
                position,
                pos,
            } => match position {
                Position::Index(index) if index < array.len() => {
                    let mut values = array.to_vec();
                    values[index] = value;
                    Ok(Value::from(values))
                }
                _ => Err(out_of_range(position, array.len(), pos)),
            },
        }
    }

    pub fn remove(&self) -> Result<Value, PointerError> {
        match *self {
            Reference::Root(_) => Err(PointerError {
                kind: PointerErrorKind::RootNotRemovable,
                pos: 0,
            }),
            Reference::Member { object, name, pos } => {
                let mut map = object.clone();
                // shift_remove() keeps the order of the members that follow
                match map.shift_remove(name) {
                    Some(_) => Ok(Value::from(map)),
                    None => Err(missing_member(name, pos)),
                }
            }
            Reference::Element {
                array,
                position,
                pos,
            } => match position {
                Position::Index(index) if index < array.len() => {
                    let mut values = Vec::with_capacity(array.len() - 1);
                    values.extend_from_slice(&array[..index]);
                    values.extend_from_slice(&array[index + 1..]);
                    Ok(Value::from(values))
                }
                _ => Err(out_of_range(position, array.len(), pos)),
            },
        }
    }

    pub fn pos(&self) -> usize {
        match *self {
            Reference::Root(_) => 0,
            Reference::Member { pos, .. } | Reference::Element { pos, .. } => pos,
        }
    }

    // same as get() but used while walking down the document, every token except the last one
    // must reference an existing value
    fn descend(&self) -> Result<&'a Value, PointerError> {
        let reason = match *self {
            Reference::Root(root) => return Ok(root),
            Reference::Member { object, name, .. } => match object.get(name) {
                Some(val) => return Ok(val),
                None => Unresolvable::NoSuchMember {
                    name: name.to_string(),
                },
            },
            Reference::Element {
                array, position, ..
            } => match position {
                Position::Index(index) if index < array.len() => return Ok(&array[index]),
                Position::Index(index) => Unresolvable::NoSuchIndex {
                    index,
                    len: array.len(),
                },
                Position::Append => Unresolvable::AppendMarker,
            },
        };
        Err(PointerError {
            kind: PointerErrorKind::UnresolvablePath { reason },
            pos: self.pos(),
        })
    }
}

/// The references produced by resolving a pointer, ordered from the leaf up to the child of the
/// root. The empty pointer resolves to a single [`Reference::Root`].
///
/// An edit is applied to the leaf and the rebuilt container is then handed to every ancestor's
/// `replace()` in turn, see [`ReferenceChain::fold`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceChain<'a, 'p> {
    // never empty
    refs: Vec<Reference<'a, 'p>>,
}

impl<'a, 'p> ReferenceChain<'a, 'p> {
    // Walking the document follows the pointer rules, the last token is allowed to reference a
    // member or an element that does not exist so add() can create it. Whether a token is a member
    // name or an array index is decided by the value it is applied to.
    pub(crate) fn resolve(ptr: &'p Pointer, target: &'a Value) -> Result<Self, PointerError> {
        let tokens = ptr.ref_tokens();
        if tokens.is_empty() {
            return Ok(ReferenceChain {
                refs: vec![Reference::Root(target)],
            });
        }

        let mut refs = Vec::with_capacity(tokens.len());
        let mut current = target;
        for (i, token) in tokens.iter().enumerate() {
            let reference = match current {
                Value::Object(map) => Reference::Member {
                    object: map,
                    name: &token.val,
                    pos: token.pos,
                },
                Value::Array(values) => Reference::Element {
                    array: values,
                    position: pointer::parse_index(token)?,
                    pos: token.pos,
                },
                _ => {
                    return Err(PointerError {
                        kind: PointerErrorKind::UnresolvablePath {
                            reason: Unresolvable::Scalar {
                                value_type: current.value_type(),
                            },
                        },
                        pos: token.pos,
                    })
                }
            };
            if i + 1 < tokens.len() {
                current = reference.descend()?;
            }
            refs.push(reference);
        }
        // leaf first
        refs.reverse();

        trace!("resolved '{ptr}' into {} references", refs.len());
        Ok(ReferenceChain { refs })
    }

    /// The reference of the last pointer token.
    pub fn leaf(&self) -> &Reference<'a, 'p> {
        &self.refs[0]
    }

    pub fn get(&self) -> Result<&'a Value, PointerError> {
        self.leaf().get()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Reference<'a, 'p>> + '_ {
        self.refs.iter()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    /// Applies `edit` to the leaf and rebuilds every ancestor up to the new root.
    ///
    /// # Example
    ///
    /// ```
    /// # use jolt_patch::{json, Pointer};
    /// #
    /// let ptr = Pointer::parse("/a/b").unwrap();
    /// let doc = json!({"a": {"b": 1, "c": 2}});
    ///
    /// let chain = ptr.resolve(&doc).unwrap();
    /// let updated = chain.fold(|leaf| leaf.replace(json!(3))).unwrap();
    /// assert_eq!(updated, json!({"a": {"b": 3, "c": 2}}));
    /// ```
    pub fn fold<F>(&self, edit: F) -> Result<Value, PointerError>
    where
        F: FnOnce(&Reference<'a, 'p>) -> Result<Value, PointerError>,
    {
        let mut result = edit(self.leaf())?;
        for reference in &self.refs[1..] {
            result = reference.replace(result)?;
        }
        Ok(result)
    }
}

fn assign_root(value: Value) -> Result<Value, PointerError> {
    if !value.is_container() {
        return Err(PointerError {
            kind: PointerErrorKind::InvalidRootAssignment,
            pos: 0,
        });
    }
    Ok(value)
}

fn missing_member(name: &str, pos: usize) -> PointerError {
    PointerError {
        kind: PointerErrorKind::MissingMember {
            name: name.to_string(),
        },
        pos,
    }
}

fn out_of_range(position: Position, len: usize, pos: usize) -> PointerError {
    let index = match position {
        Position::Index(index) => Some(index),
        Position::Append => None,
    };
    PointerError {
        kind: PointerErrorKind::IndexOutOfRange { index, len },
        pos,
    }
}
