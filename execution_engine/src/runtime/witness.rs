use std::{collections::BTreeSet, iter};

use halcyon_storage::{
    global_state::{error::Error as GlobalStateError, StateReader},
    tracking_copy::TrackingCopyExt,
};
use halcyon_types::{Key, ScriptHash, StoredValue};

use super::{ScriptContainer, StandardService};
use crate::execution::Error;

impl<R> StandardService<R>
where
    R: StateReader<Key, StoredValue, Error = GlobalStateError>,
{
    /// Returns the script hashes `container` must carry a witness for.
    ///
    /// A transaction is verified against its signers. A block is verified against the
    /// `next_consensus` of its parent's header; the genesis block has no verifying hash.
    pub fn script_hashes_for_verifying(
        &self,
        container: &ScriptContainer,
    ) -> Result<BTreeSet<ScriptHash>, Error> {
        match container {
            ScriptContainer::Transaction(transaction) => {
                Ok(transaction.signers().iter().copied().collect())
            }
            ScriptContainer::Block(block) => {
                let header = block.header();
                if header.is_genesis() {
                    return Ok(BTreeSet::new());
                }
                let prev_hash = *header.prev_hash();
                let prev_header = self
                    .tracking_copy
                    .borrow_mut()
                    .read_header(&prev_hash)?
                    .ok_or(Error::HeaderNotFound(prev_hash))?;
                Ok(iter::once(*prev_header.next_consensus()).collect())
            }
        }
    }

    /// Returns `true` if `container` was witnessed by `script_hash`.
    pub fn check_witness(
        &self,
        container: &ScriptContainer,
        script_hash: &ScriptHash,
    ) -> Result<bool, Error> {
        Ok(self
            .script_hashes_for_verifying(container)?
            .contains(script_hash))
    }
}
