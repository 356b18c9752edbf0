//! Try regions and the per-instruction handler table.

use crate::address_index::AddressIndex;
use crate::error::{IrError, Result};
use crate::types::TypeRef;

/// One declared handler of a try region. `catch_type` of `None` is the
/// catch-all clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHandler {
    pub handler_addr: u32,
    pub catch_type: Option<TypeRef>,
}

/// A raw try region as the container declares it: a code-unit address range
/// with its handlers in declaration order (catch-all last, if present).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryRegion {
    pub start_addr: u32,
    /// Exclusive: the address immediately after the last covered instruction.
    pub end_addr: u32,
    pub handlers: Vec<RawHandler>,
}

/// A handler with its entry point resolved to an instruction index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handler {
    pub handler_index: usize,
    pub catch_type: Option<TypeRef>,
}

/// For every instruction index, the handlers applicable at that index, in
/// declaration order. Overlapping regions accumulate cumulatively, also in
/// declaration order.
#[derive(Debug, Clone, Default)]
pub struct HandlerTable {
    entries: Vec<Vec<Handler>>,
}

impl HandlerTable {
    /// Resolve the raw try table against the address index. `sizes` holds
    /// each indexed instruction's size in code units.
    pub fn resolve(
        regions: &[TryRegion],
        index: &AddressIndex,
        sizes: &[u32],
    ) -> Result<HandlerTable> {
        let mut entries = vec![Vec::new(); index.len()];
        if index.is_empty() {
            return Ok(HandlerTable { entries });
        }
        let last = index.len() - 1;
        for region in regions {
            let start = index.index_of(region.start_addr)?;
            let end = if region.end_addr > index.address_of(last)? {
                // The region runs to the end of the method; the end address
                // must then line up with the last instruction's end exactly.
                let expected = index.address_of(last)? + sizes[last];
                if region.end_addr != expected {
                    return Err(IrError::TryEndMismatch {
                        end: region.end_addr,
                        expected,
                    });
                }
                last
            } else {
                // A region ending at or before its own start covers nothing.
                index
                    .index_of(region.end_addr)?
                    .checked_sub(1)
                    .filter(|&e| e >= start)
                    .ok_or(IrError::EmptyTryRegion {
                        start: region.start_addr,
                        end: region.end_addr,
                    })?
            };
            let resolved: Vec<Handler> = region
                .handlers
                .iter()
                .map(|h| {
                    Ok(Handler {
                        handler_index: index.index_of(h.handler_addr)?,
                        catch_type: h.catch_type.clone(),
                    })
                })
                .collect::<Result<_>>()?;
            for entry in &mut entries[start..=end] {
                entry.extend(resolved.iter().cloned());
            }
        }
        Ok(HandlerTable { entries })
    }

    /// Handlers applicable at an instruction index. Empty when the index is
    /// covered by no try region.
    pub fn handlers_at(&self, index: usize) -> &[Handler] {
        self.entries.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
