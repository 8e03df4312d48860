//! Blocks taken from the production chain must decode, re-encode byte for
//! byte and reproduce their published identifiers and signatures.

use anyhow::Result;
use stakechain_core::{
    Block, BlockStakeOutputIndexes, Currency, ExtraObject, Transaction, TransactionVersion,
    UnlockFulfillment, UnlockHash,
};
use stakechain_encoding::{from_compact_bytes, from_fixed_bytes, to_compact_bytes, to_fixed_bytes};

struct Expected {
    hex: &'static str,
    id: &'static str,
    timestamp: u64,
    pobs_height: u64,
    payouts: &'static [u64],
    transactions: &'static [(&'static str, &'static [&'static str])],
}

const BLOCKS: &[Expected] = &[
    Expected {
        hex: include_str!("vectors/block_3.hex"),
        id: "bf6d4ec82090dff9ef4f4ed2b9c8841a4debf3780d9a8ca83a47b5e690b08102",
        timestamp: 1524169049,
        pobs_height: 2,
        payouts: &[1_000_000_000],
        transactions: &[(
            "207e8eb3800658941cc0d7977a0c5f1730a67fa6e41cc8b175a7b38f15ac9b3e",
            &["cb00750083709541eb560525a5d47aefdda5c11a3f89e237dcbfcb16c1968cbe"],
        )],
    },
    Expected {
        hex: include_str!("vectors/block_5.hex"),
        id: "edde102707023a7eda81f7f3bccbe31ce0c01f6f344e929ce95fd41a63c2e1d1",
        timestamp: 1524169770,
        pobs_height: 4,
        payouts: &[1_000_000_000],
        transactions: &[(
            "27a922545eb66ce86c1f758737972a7fde26efbad37a340a47de1e3eb4c66507",
            &["8a681616dbe6cd95d415b40ce4d1e1c03c620f503ad8444f16f1a57c3f1f98b2"],
        )],
    },
    Expected {
        hex: include_str!("vectors/block_42.hex"),
        id: "1096b5a35d810496b3164436016d36ee24ae81ebae56993776fffbe650200e0d",
        timestamp: 1524216449,
        pobs_height: 41,
        payouts: &[1_000_000_000],
        transactions: &[(
            "42ba862706ad0a69a49c0ffd29574e3decb21ebf7e5e2319874632735a92811c",
            &["ea3fad51fad94ae3bda4729d368a98265e1907d11f8973dd02c3d6f36732fd03"],
        )],
    },
    Expected {
        hex: include_str!("vectors/block_7535.hex"),
        id: "f1b89716b535f4af81b590d12d8e742457478ef39b20fdbc1c855b217a3b9076",
        timestamp: 1525101295,
        pobs_height: 7504,
        payouts: &[1_000_000_000],
        transactions: &[(
            "0ab2f2f3cd738bf2394799135968ba5a2eeb12dbd892478f427ed219b37a6152",
            &["46d1122163a794167fe4250719e99356502521d84bf245ae0e2bbed308ed135b"],
        )],
    },
    Expected {
        hex: include_str!("vectors/block_8143.hex"),
        id: "f1660e627a32f91be080a323a6531cff2da6a468b227bdb06294456cbcd5e53e",
        timestamp: 1525242351,
        pobs_height: 8142,
        payouts: &[1_000_000_000, 100_000_000],
        transactions: &[
            (
                "2717091c200a5b338addff234ed9190c1e8ea4ab789ee2202ec9f7afd5517f96",
                &["f657fa01104a62f4ed714fe5c6c960309aa22ae2be45a5224485e2040fea84eb"],
            ),
            (
                "0d7c6ef25729128b01f9df7e274fae781157dcf247e17b2018fa72a5a8fb1e9f",
                &["b62a205991979109e9028930cbd2468bd90c4f1e5daebbc2e5251abd1bebf90f"],
            ),
        ],
    },
];

fn decode(expected: &Expected) -> Result<(Vec<u8>, Block)> {
    let bytes = hex::decode(expected.hex.trim())?;
    let block = from_fixed_bytes::<Block>(&bytes)?;
    Ok((bytes, block))
}

fn input_fulfillments(tx: &Transaction) -> Vec<&UnlockFulfillment> {
    tx.coin_inputs
        .iter()
        .map(|input| &input.fulfillment)
        .chain(tx.block_stake_inputs.iter().map(|input| &input.fulfillment))
        .collect()
}

#[test]
fn test_blocks_reencode_exactly() -> Result<()> {
    for expected in BLOCKS {
        let (bytes, block) = decode(expected)?;
        assert_eq!(to_fixed_bytes(&block), bytes, "block {}", expected.id);
        let compact = to_compact_bytes(&block)?;
        assert_eq!(from_compact_bytes::<Block>(&compact)?, block);
    }
    Ok(())
}

#[test]
fn test_blocks_reproduce_fields() -> Result<()> {
    for expected in BLOCKS {
        let (_, block) = decode(expected)?;
        assert_eq!(block.id().to_hex(), expected.id);
        assert_eq!(block.header().id(), block.id());
        assert_eq!(block.timestamp, expected.timestamp);
        assert_eq!(
            block.pobs_output,
            BlockStakeOutputIndexes {
                block_height: expected.pobs_height,
                transaction_index: 0,
                output_index: 0,
            }
        );
        let payouts: Vec<Currency> = expected.payouts.iter().map(|&v| Currency::from(v)).collect();
        assert_eq!(
            block
                .miner_payouts
                .iter()
                .map(|p| p.value.clone())
                .collect::<Vec<_>>(),
            payouts
        );
        assert_eq!(block.transactions.len(), expected.transactions.len());
        for (tx, (id, _)) in block.transactions.iter().zip(expected.transactions) {
            assert_eq!(tx.version, TransactionVersion::Legacy);
            assert_eq!(tx.id().to_hex(), *id);
        }
    }
    Ok(())
}

#[test]
fn test_historical_signatures_verify() -> Result<()> {
    for expected in BLOCKS {
        let (_, block) = decode(expected)?;
        for (tx, (_, sighashes)) in block.transactions.iter().zip(expected.transactions) {
            let fulfillments = input_fulfillments(tx);
            assert_eq!(fulfillments.len(), sighashes.len());
            for (fulfillment, sighash) in fulfillments.into_iter().zip(sighashes.iter()) {
                // every historical input here is the first of its kind
                let hash = tx.signature_hash(&[ExtraObject::InputIndex(0)]);
                assert_eq!(hash.to_hex(), *sighash);
                let UnlockFulfillment::SingleSignature(ss) = fulfillment else {
                    panic!("unexpected fulfillment {:?}", fulfillment);
                };
                ss.public_key.verify_hash(&hash, &ss.signature.0)?;
                assert!(ss
                    .public_key
                    .verify_hash(&tx.signature_hash(&[ExtraObject::InputIndex(1)]), &ss.signature.0)
                    .is_err());
            }
        }
    }
    Ok(())
}

#[test]
fn test_fee_block_totals() -> Result<()> {
    let (_, block) = decode(&BLOCKS[4])?;
    assert_eq!(block.calculate_total_miner_fees(), Currency::from(100_000_000));
    let tx = &block.transactions[1];
    assert_eq!(tx.coin_inputs.len(), 1);
    assert_eq!(tx.coin_outputs.len(), 5);
    assert_ne!(block.miner_payout_id(0), block.miner_payout_id(1));
    Ok(())
}

#[test]
fn test_block_json_matches_explorer() -> Result<()> {
    let json = r#"{
        "parentid": "026e4b5c1d54d6237ec7246e789ee34a63ae98540bb63971c2e7f19904f77758",
        "timestamp": 1524169049,
        "pobsindexes": {"BlockHeight": 2, "TransactionIndex": 0, "OutputIndex": 0},
        "minerpayouts": [{
            "value": "1000000000",
            "unlockhash": "01ad4f73417476f8b8350298681dd0fa8640baa53a91915417b1dd8103d118b543c992e6fba1c4"
        }],
        "transactions": [{
            "version": 0,
            "data": {
                "coininputs": null,
                "blockstakeinputs": [{
                    "parentid": "441ac4150342765cb73c6656613ee2aaa79173cffa8b19fda3eadc5aadc3d682",
                    "unlocker": {
                        "type": 1,
                        "condition": {
                            "publickey": "ed25519:b5662caa078efd42b25f3ab10768b55fd0607ed8cb8e3c44f3b26df1d17ef934"
                        },
                        "fulfillment": {
                            "signature": "b30700ee21a314e0838e460649c2519ab58fe28413298bc5ee8feb2af0284f46e71eb24453a8f8c89c200735ee9100c7f859999dfe5dfc8be7964545d05e7008"
                        }
                    }
                }],
                "blockstakeoutputs": [{
                    "value": "100",
                    "unlockhash": "01ad4f73417476f8b8350298681dd0fa8640baa53a91915417b1dd8103d118b543c992e6fba1c4"
                }],
                "minerfees": null
            }
        }]
    }"#;
    let (_, decoded) = decode(&BLOCKS[0])?;
    let parsed: Block = serde_json::from_str(json)?;
    assert_eq!(parsed, decoded);
    assert_eq!(
        serde_json::to_value(&decoded)?,
        serde_json::from_str::<serde_json::Value>(json)?
    );
    let owner: UnlockHash =
        "01ad4f73417476f8b8350298681dd0fa8640baa53a91915417b1dd8103d118b543c992e6fba1c4".parse()?;
    assert_eq!(decoded.miner_payouts[0].unlock_hash, owner);
    Ok(())
}
