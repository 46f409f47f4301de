//! Ordered set of free address space.
//!
//! An [`AddressSet`] holds disjoint CIDR blocks sorted by start address,
//! with contiguous neighbours merged and stored in minimal CIDR form.

use super::cidr_range::{aligned_cidrs, range_to_cidrs};
use crate::error::PlanError;
use crate::models::{Address, CidrBlock};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSet {
    blocks: Vec<CidrBlock>,
}

impl AddressSet {
    /// Create a set from blocks that are already disjoint. Only sorts.
    pub fn new(blocks: impl IntoIterator<Item = CidrBlock>) -> AddressSet {
        let mut blocks: Vec<CidrBlock> = blocks.into_iter().collect();
        blocks.sort_by_key(|b| b.start());
        AddressSet { blocks }
    }

    pub fn blocks(&self) -> &[CidrBlock] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The lowest block of mask length `mask` inside the head of the set.
    ///
    /// Only the head donates space. The set is not changed; pass the result
    /// to [`AddressSet::remove_block`] to claim it.
    pub fn take_next_block(&self, mask: u8) -> Result<CidrBlock, PlanError> {
        let head = match self.blocks.first() {
            Some(head) if head.mask <= mask => head,
            head => {
                return Err(PlanError::InsufficientSpace {
                    mask,
                    head: head.copied(),
                })
            }
        };
        head.first_subnet(mask)
    }

    /// Subtract `cidr` from the block that contains it.
    ///
    /// `cidr` must be a prefix or a suffix of that block. What is left is
    /// re-covered with minimal CIDRs and merged back in. On error the set is
    /// unchanged.
    pub fn remove_block(&mut self, cidr: &CidrBlock) -> Result<(), PlanError> {
        let (ymin, ymax) = cidr.range();
        let i = self
            .blocks
            .iter()
            .position(|b| b.contains(cidr))
            .ok_or_else(|| {
                log::error!("cidr to subtract not within set {cidr} {self}");
                PlanError::NotContained { cidr: *cidr }
            })?;
        let superset = self.blocks[i];
        let (xmin, xmax) = superset.range();

        let residual: Option<(Address, Address)> = if xmin == ymin && xmax == ymax {
            None
        } else if xmin == ymin {
            Some((ymax + 1, xmax))
        } else if xmax == ymax {
            Some((xmin, ymin - 1))
        } else {
            log::error!("{cidr} is neither a prefix nor a suffix of {superset}");
            return Err(PlanError::UnsupportedSplit {
                cidr: *cidr,
                superset,
            });
        };

        self.blocks.remove(i);
        log::debug!("remove_block({cidr}) from {superset}, residual={residual:?}");

        if let Some((min, max)) = residual {
            for block in range_to_cidrs(min, max)? {
                self.add_block(block)?;
            }
        }
        Ok(())
    }

    /// Insert `cidr` in address order and merge it with contiguous neighbours.
    ///
    /// The block must not overlap anything already in the set.
    pub fn add_block(&mut self, cidr: CidrBlock) -> Result<(), PlanError> {
        let max = cidr.end();
        let i = self
            .blocks
            .iter()
            .position(|b| b.start() >= max)
            .unwrap_or(self.blocks.len());
        self.blocks.insert(i, cidr);

        if self.blocks.len() <= 1 {
            return Ok(());
        }

        let ranges = self.ranges();

        // nothing merged, the list is already canonical
        if ranges.len() >= self.blocks.len() {
            return Ok(());
        }

        let mut blocks = Vec::with_capacity(ranges.len());
        for (min, max) in ranges {
            blocks.extend(range_to_cidrs(min, max)?);
        }
        log::debug!(
            "add_block({cidr}) merged {} block(s) into {}",
            self.blocks.len(),
            blocks.len()
        );
        self.blocks = blocks;
        Ok(())
    }

    /// Contiguous address ranges in the set, with neighbouring blocks joined.
    fn ranges(&self) -> Vec<(Address, Address)> {
        let mut ranges: Vec<(Address, Address)> = Vec::with_capacity(self.blocks.len());
        for block in &self.blocks {
            match ranges.last_mut() {
                Some(last) if last.1 as u64 + 1 == block.start() as u64 => last.1 = block.end(),
                _ => ranges.push(block.range()),
            }
        }
        ranges
    }

    /// The free space re-expressed as aligned CIDR blocks, ascending.
    ///
    /// Stored blocks may start off their own boundary; these never do.
    pub fn aligned_blocks(&self) -> Result<Vec<CidrBlock>, PlanError> {
        let mut blocks = Vec::with_capacity(self.blocks.len());
        for (min, max) in self.ranges() {
            blocks.extend(aligned_cidrs(min, max)?);
        }
        Ok(blocks)
    }

    /// Sum of the addresses in every block.
    pub fn total_address_count(&self) -> u64 {
        self.blocks.iter().map(|b| b.address_count()).sum()
    }
}

impl fmt::Display for AddressSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cidrs: Vec<String> = self.blocks.iter().map(|c| c.to_string()).collect();
        write!(f, "[{}]", cidrs.join(", "))
    }
}
