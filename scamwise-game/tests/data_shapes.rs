use scamwise_game::{
    Category, Difficulty, DifficultyFilter, Presentation, Rank, ScenarioData, SessionConfig,
    ToolId,
};

#[test]
fn every_presentation_type_parses_from_json() {
    let json = r#"{
        "scenarios": [
            {
                "id": 1,
                "category": "wallet",
                "difficulty": "easy",
                "type": "email",
                "title": "Phishing Email",
                "from": "security@metamask-support.com",
                "to": "you@email.com",
                "subject": "Verify now",
                "body": "Click here.",
                "question": "Scam or legit?",
                "correctAnswer": "scam",
                "options": [
                    { "id": "scam", "text": "Scam" },
                    { "id": "legit", "text": "Legit" }
                ],
                "feedback": { "correct": "c", "incorrect": "i", "xpReward": 100 }
            },
            {
                "id": 2,
                "category": "defi",
                "difficulty": "medium",
                "type": "website",
                "title": "Fake DEX",
                "url": "https://un1swap.xyz",
                "content": "<h1>Connect</h1>",
                "question": "Connect your wallet?",
                "correctAnswer": "no",
                "options": [
                    { "id": "yes", "text": "Yes" },
                    { "id": "no", "text": "No" }
                ],
                "tools": ["urlAnalyzer", "tokenScanner"],
                "feedback": { "correct": "c", "incorrect": "i", "xpReward": 150 }
            },
            {
                "id": 3,
                "category": "nft",
                "difficulty": "hard",
                "type": "transaction",
                "title": "Drainer Approval",
                "txData": {
                    "to": "0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef",
                    "fields": [
                        { "label": "Function", "value": "setApprovalForAll" }
                    ],
                    "decodedFunction": "setApprovalForAll(address,bool)",
                    "decodedParams": [
                        { "label": "operator", "value": "0xdead..." }
                    ]
                },
                "question": "Approve this transaction?",
                "correctAnswer": "reject",
                "options": [
                    { "id": "approve", "text": "Approve" },
                    { "id": "reject", "text": "Reject" }
                ],
                "tools": ["contractAnalyzer", "addressLookup"],
                "feedback": {
                    "correct": "c",
                    "incorrect": "i",
                    "xpReward": 200,
                    "redFlags": ["Unlimited approval"],
                    "blockchainInfo": ["setApprovalForAll grants full collection access"]
                }
            },
            {
                "id": 4,
                "category": "social",
                "difficulty": "medium",
                "type": "chat",
                "title": "Romance Scam",
                "messages": [
                    { "sender": "them", "from": "Alex", "text": "Trust me", "time": "14:02" },
                    { "sender": "you", "text": "Hmm", "time": "14:03" }
                ],
                "question": "Send the funds?",
                "correctAnswer": "never",
                "options": [
                    { "id": "send", "text": "Send" },
                    { "id": "never", "text": "Never" }
                ],
                "feedback": { "correct": "c", "incorrect": "i", "xpReward": 120 }
            }
        ]
    }"#;

    let data = ScenarioData::from_json(json).unwrap();
    data.validate().unwrap();
    assert_eq!(data.len(), 4);

    assert!(matches!(
        data.scenarios[0].presentation,
        Presentation::Email { .. }
    ));
    assert!(matches!(
        data.scenarios[1].presentation,
        Presentation::Website { .. }
    ));
    match &data.scenarios[2].presentation {
        Presentation::Transaction { tx_data } => {
            assert_eq!(
                tx_data.to.as_deref(),
                Some("0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef")
            );
            assert_eq!(tx_data.decoded_params.len(), 1);
        }
        other => panic!("expected transaction presentation, got {other:?}"),
    }
    match &data.scenarios[3].presentation {
        Presentation::Chat { messages } => {
            assert_eq!(messages.len(), 2);
            assert_eq!(messages[0].from.as_deref(), Some("Alex"));
            assert!(messages[1].from.is_none());
        }
        other => panic!("expected chat presentation, got {other:?}"),
    }

    // Legacy tool names alias onto the stub library's ids.
    assert_eq!(
        data.scenarios[1].tools.as_slice(),
        [ToolId::UrlScanner, ToolId::TokenScanner]
    );
    assert_eq!(
        data.scenarios[2].tools.as_slice(),
        [ToolId::ContractAnalyzer, ToolId::AddressLookup]
    );

    assert_eq!(data.scenarios[2].feedback.context.len(), 1);
    assert_eq!(data.count_in_category(Category::Nft), 1);
}

#[test]
fn scenarios_roundtrip_through_serialization() {
    let json = r#"{
        "scenarios": [
            {
                "id": 9,
                "category": "layer2",
                "difficulty": "hard",
                "type": "website",
                "title": "Bridge Drain",
                "url": "https://bridge.example",
                "content": "",
                "question": "Use this bridge?",
                "correctAnswer": "no",
                "options": [{ "id": "no", "text": "No" }],
                "feedback": { "correct": "c", "incorrect": "i", "xpReward": 180 }
            }
        ]
    }"#;

    let data = ScenarioData::from_json(json).unwrap();
    let serialized = serde_json::to_string(&data).unwrap();
    let restored = ScenarioData::from_json(&serialized).unwrap();
    assert_eq!(restored, data);
}

#[test]
fn config_parses_menu_shaped_json() {
    let config: SessionConfig =
        serde_json::from_str(r#"{ "quizLength": 15, "difficulty": "hard" }"#).unwrap();
    assert_eq!(config.quiz_length, 15);
    assert_eq!(config.difficulty, DifficultyFilter::Hard);

    let default = SessionConfig::default();
    assert_eq!(default.quiz_length, 30);
    assert_eq!(default.difficulty, DifficultyFilter::All);
}

#[test]
fn enum_wire_names_stay_stable() {
    assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), r#""hard""#);
    assert_eq!(serde_json::to_string(&Category::Layer2).unwrap(), r#""layer2""#);
    assert_eq!(
        serde_json::to_string(&Rank::BlockchainGuardian).unwrap(),
        r#""blockchain_guardian""#
    );
    assert_eq!(
        serde_json::to_string(&ToolId::UrlScanner).unwrap(),
        r#""urlScanner""#
    );
}
