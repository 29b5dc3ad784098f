use alloy_primitives::Address;
use tracing::debug;

use crate::codec::ids::Id;
use crate::codec::{CODEC_VERSION, Reader};
use crate::models::errors::{DecodeError, MapperError};

// Minimum encoded sizes, used to bound slice lengths before allocating
const TRANSFERABLE_INPUT_MIN_SIZE: usize = 32 + 4 + 32 + 4 + 8 + 4;
const TRANSFERABLE_OUTPUT_MIN_SIZE: usize = 32 + 4 + 8 + 8 + 4 + 4;
const EVM_OUTPUT_SIZE: usize = 20 + 8 + 32;
const EVM_INPUT_SIZE: usize = 20 + 8 + 32 + 8;
const CREDENTIAL_MIN_SIZE: usize = 4 + 4;
const SIGNATURE_LEN: usize = 65;
const SHORT_ID_LEN: usize = 20;

/// Type IDs in registration order. IDs 2-4 are reserved and never assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeId {
    ImportTx,
    ExportTx,
    TransferInput,
    MintOutput,
    TransferOutput,
    MintOperation,
    Credential,
    Input,
    OutputOwners,
}

impl TypeId {
    fn from_u32(id: u32) -> Result<Self, DecodeError> {
        match id {
            0 => Ok(Self::ImportTx),
            1 => Ok(Self::ExportTx),
            5 => Ok(Self::TransferInput),
            6 => Ok(Self::MintOutput),
            7 => Ok(Self::TransferOutput),
            8 => Ok(Self::MintOperation),
            9 => Ok(Self::Credential),
            10 => Ok(Self::Input),
            11 => Ok(Self::OutputOwners),
            _ => Err(DecodeError::UnknownTypeId(id)),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::ImportTx => "UnsignedImportTx",
            Self::ExportTx => "UnsignedExportTx",
            Self::TransferInput => "secp256k1fx.TransferInput",
            Self::MintOutput => "secp256k1fx.MintOutput",
            Self::TransferOutput => "secp256k1fx.TransferOutput",
            Self::MintOperation => "secp256k1fx.MintOperation",
            Self::Credential => "secp256k1fx.Credential",
            Self::Input => "secp256k1fx.Input",
            Self::OutputOwners => "secp256k1fx.OutputOwners",
        }
    }
}

/// A signed atomic transaction moving value between this chain and another
/// chain of the same network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tx {
    pub unsigned: UnsignedAtomicTx,
    pub credentials: Vec<Credential>,
    /// sha256 of the signed bytes
    pub id: Id,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsignedAtomicTx {
    Import(UnsignedImportTx),
    Export(UnsignedExportTx),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedImportTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub source_chain: Id,
    pub imported_inputs: Vec<TransferableInput>,
    pub outs: Vec<EvmOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsignedExportTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub destination_chain: Id,
    pub ins: Vec<EvmInput>,
    pub exported_outputs: Vec<TransferableOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableInput {
    pub tx_id: Id,
    pub output_index: u32,
    pub asset_id: Id,
    pub amount: u64,
    pub sig_indices: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferableOutput {
    pub asset_id: Id,
    pub amount: u64,
    pub locktime: u64,
    pub threshold: u32,
    pub addrs: Vec<[u8; SHORT_ID_LEN]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvmOutput {
    pub address: Address,
    pub amount: u64,
    pub asset_id: Id,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvmInput {
    pub address: Address,
    pub amount: u64,
    pub asset_id: Id,
    pub nonce: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub signatures: Vec<[u8; SIGNATURE_LEN]>,
}

impl Tx {
    /// Decodes a versioned, signed atomic transaction. The whole input must
    /// be consumed.
    pub fn unmarshal(bytes: &[u8]) -> Result<Self, MapperError> {
        let mut reader = Reader::new(bytes);

        let version = reader.read_u16()?;
        if version != CODEC_VERSION {
            return Err(DecodeError::UnknownCodecVersion(version).into());
        }

        let unsigned = read_unsigned_tx(&mut reader)?;
        let credentials = reader.read_vec(CREDENTIAL_MIN_SIZE, read_credential)?;
        reader.finish()?;

        let id = Id::hash_of(bytes);
        debug!(tx_id = %id, len = bytes.len(), "Decoded atomic transaction");

        Ok(Self {
            unsigned,
            credentials,
            id,
        })
    }
}

fn read_unsigned_tx(reader: &mut Reader<'_>) -> Result<UnsignedAtomicTx, MapperError> {
    match TypeId::from_u32(reader.read_u32()?)? {
        TypeId::ImportTx => Ok(UnsignedAtomicTx::Import(read_import_tx(reader)?)),
        TypeId::ExportTx => Ok(UnsignedAtomicTx::Export(read_export_tx(reader)?)),
        other => Err(MapperError::UnsupportedTransaction {
            type_name: other.name(),
        }),
    }
}

fn read_id(reader: &mut Reader<'_>) -> Result<Id, DecodeError> {
    reader.read_array().map(Id)
}

fn read_address(reader: &mut Reader<'_>) -> Result<Address, DecodeError> {
    reader.read_array::<20>().map(Address::from)
}

fn expect_type(reader: &mut Reader<'_>, expected: TypeId) -> Result<(), DecodeError> {
    let offset = reader.offset();
    let type_id = reader.read_u32()?;
    if TypeId::from_u32(type_id)? != expected {
        return Err(DecodeError::UnexpectedType {
            expected: expected.name(),
            type_id,
            offset,
        });
    }
    Ok(())
}

fn read_import_tx(reader: &mut Reader<'_>) -> Result<UnsignedImportTx, DecodeError> {
    Ok(UnsignedImportTx {
        network_id: reader.read_u32()?,
        blockchain_id: read_id(reader)?,
        source_chain: read_id(reader)?,
        imported_inputs: reader.read_vec(TRANSFERABLE_INPUT_MIN_SIZE, read_transferable_input)?,
        outs: reader.read_vec(EVM_OUTPUT_SIZE, |r| {
            Ok(EvmOutput {
                address: read_address(r)?,
                amount: r.read_u64()?,
                asset_id: read_id(r)?,
            })
        })?,
    })
}

fn read_export_tx(reader: &mut Reader<'_>) -> Result<UnsignedExportTx, DecodeError> {
    Ok(UnsignedExportTx {
        network_id: reader.read_u32()?,
        blockchain_id: read_id(reader)?,
        destination_chain: read_id(reader)?,
        ins: reader.read_vec(EVM_INPUT_SIZE, |r| {
            Ok(EvmInput {
                address: read_address(r)?,
                amount: r.read_u64()?,
                asset_id: read_id(r)?,
                nonce: r.read_u64()?,
            })
        })?,
        exported_outputs: reader.read_vec(TRANSFERABLE_OUTPUT_MIN_SIZE, read_transferable_output)?,
    })
}

fn read_transferable_input(reader: &mut Reader<'_>) -> Result<TransferableInput, DecodeError> {
    let tx_id = read_id(reader)?;
    let output_index = reader.read_u32()?;
    let asset_id = read_id(reader)?;
    expect_type(reader, TypeId::TransferInput)?;
    let amount = reader.read_u64()?;
    let sig_indices = reader.read_vec(4, |r| r.read_u32())?;

    Ok(TransferableInput {
        tx_id,
        output_index,
        asset_id,
        amount,
        sig_indices,
    })
}

fn read_transferable_output(reader: &mut Reader<'_>) -> Result<TransferableOutput, DecodeError> {
    let asset_id = read_id(reader)?;
    expect_type(reader, TypeId::TransferOutput)?;

    Ok(TransferableOutput {
        asset_id,
        amount: reader.read_u64()?,
        locktime: reader.read_u64()?,
        threshold: reader.read_u32()?,
        addrs: reader.read_vec(SHORT_ID_LEN, |r| r.read_array())?,
    })
}

fn read_credential(reader: &mut Reader<'_>) -> Result<Credential, DecodeError> {
    expect_type(reader, TypeId::Credential)?;
    Ok(Credential {
        signatures: reader.read_vec(SIGNATURE_LEN, |r| r.read_array())?,
    })
}
