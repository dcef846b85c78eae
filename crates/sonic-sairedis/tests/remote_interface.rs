mod common;

use common::{fv, MockChannelFactory};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use sonic_sai::metadata::{port_attr, switch_attr};
use sonic_sai::{
    FdbEntry, ObjectKey, RawSaiObjectId, SaiAttribute, SaiAttributeValue, SaiError, SaiList,
    SaiObjectType, SaiPointer, SaiStatus, NULL_OBJECT_ID,
};
use sonic_sairedis::channel::{commands, ChannelKind};
use sonic_sairedis::notification::{PortOperStatusData, PortStateChangeFn, PORT_STATE_CHANGE};
use sonic_sairedis::remote::redis_switch_attr;
use sonic_sairedis::vid;
use sonic_sairedis::{
    AttrCapability, BulkOpErrorMode, CommunicationMode, ContextConfig, ExtensionCommand,
    NotifySyncd, RemoteInterface, SimpleVidIndexGenerator, StatCapability,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

const SWITCH_ID: RawSaiObjectId = 0x21000000000000;

fn setup(generator: SimpleVidIndexGenerator) -> (MockChannelFactory, Arc<RemoteInterface>) {
    let factory = MockChannelFactory::with_generator(generator);
    let config = ContextConfig::new(0, "syncd")
        .with_switch(0, "")
        .unwrap()
        .with_switch(1, "0000:02:00.0")
        .unwrap();
    let ri = RemoteInterface::new(Arc::new(config), Arc::new(factory.clone()));
    ri.api_initialize().unwrap();
    (factory, ri)
}

fn init_switch(extra: Vec<SaiAttribute>) -> Vec<SaiAttribute> {
    let mut attrs = vec![SaiAttribute::new(
        switch_attr::INIT_SWITCH,
        SaiAttributeValue::Bool(true),
    )];
    attrs.extend(extra);
    attrs
}

fn create_switch(ri: &RemoteInterface) -> RawSaiObjectId {
    ri.create(SaiObjectType::Switch, NULL_OBJECT_ID, &init_switch(vec![]))
        .unwrap()
}

fn extension(ri: &RemoteInterface, command: ExtensionCommand) -> sonic_sai::SaiResult<()> {
    ri.set(
        SaiObjectType::Switch,
        &ObjectKey::Oid(SWITCH_ID),
        &command.into_attribute(),
    )
}

fn speed(value: u32) -> Vec<SaiAttribute> {
    vec![SaiAttribute::new(port_attr::SPEED, SaiAttributeValue::U32(value))]
}

#[test]
fn test_handle_layout() {
    let port = vid::construct_object_id(SaiObjectType::Port, 0, 0x123, 0);
    assert_eq!(port, 0x1000000000123);
    assert_eq!(vid::object_type_query(port), SaiObjectType::Port);
    assert_eq!(vid::switch_id_query(port), SWITCH_ID);
    assert_eq!(vid::object_counter(port), 0x123);

    let remote = vid::construct_object_id(SaiObjectType::Vlan, 2, 77, 3);
    assert_eq!(vid::switch_index(remote), 2);
    assert_eq!(vid::global_context(remote), 3);
    assert_eq!(
        vid::switch_id_query(remote),
        vid::construct_object_id(SaiObjectType::Switch, 2, 2, 3)
    );
    assert_eq!(vid::object_type_query(NULL_OBJECT_ID), SaiObjectType::Null);
}

#[test]
fn test_switch_handle_depends_only_on_hwinfo() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());

    assert_eq!(create_switch(&ri), SWITCH_ID);
    assert_eq!(create_switch(&ri), SWITCH_ID);

    let second = ri
        .create(
            SaiObjectType::Switch,
            NULL_OBJECT_ID,
            &init_switch(vec![SaiAttribute::new(
                switch_attr::SWITCH_HARDWARE_INFO,
                SaiAttributeValue::Chardata("0000:02:00.0".into()),
            )]),
        )
        .unwrap();
    assert_eq!(vid::switch_index(second), 1);
    assert_eq!(vid::object_type_query(second), SaiObjectType::Switch);
    assert!(ri.contains_switch(SWITCH_ID));
    assert!(ri.contains_switch(second));

    let unknown = ri.create(
        SaiObjectType::Switch,
        NULL_OBJECT_ID,
        &init_switch(vec![SaiAttribute::new(
            switch_attr::SWITCH_HARDWARE_INFO,
            SaiAttributeValue::Chardata("missing".into()),
        )]),
    );
    assert_eq!(unknown.unwrap_err().status(), SaiStatus::Failure);
    assert_eq!(factory.requests().len(), 3);
}

#[test]
fn test_async_create_does_not_wait() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::starting_at(0x122));
    create_switch(&ri);
    factory.respond(commands::GET_RESPONSE, SaiStatus::Failure, vec![]);

    let port = ri.create(SaiObjectType::Port, SWITCH_ID, &speed(100_000)).unwrap();
    assert_eq!(port, 0x1000000000123);

    let req = factory.last_request().unwrap();
    assert_eq!(req.key, "SAI_OBJECT_TYPE_PORT:oid:0x1000000000123");
    assert_eq!(req.op, commands::CREATE);
    assert_eq!(req.fvs, vec![fv("SAI_PORT_ATTR_SPEED", "100000")]);
    assert!(factory.waits().is_empty());
    assert_eq!(factory.pending_responses(), 1);
}

#[test]
fn test_set_blocks_only_in_sync_mode() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);
    factory.delay_responses(Duration::from_millis(50));
    factory.respond(commands::GET_RESPONSE, SaiStatus::Success, vec![]);

    let port = ObjectKey::Oid(0x1000000000001);
    let mtu = SaiAttribute::new(port_attr::MTU, SaiAttributeValue::U32(9100));

    let start = Instant::now();
    ri.set(SaiObjectType::Port, &port, &mtu).unwrap();
    assert!(start.elapsed() < Duration::from_millis(50));
    assert_eq!(factory.pending_responses(), 1);
    assert_eq!(factory.last_request().unwrap().op, commands::SET);

    extension(&ri, ExtensionCommand::SyncMode(true)).unwrap();
    let start = Instant::now();
    ri.set(SaiObjectType::Port, &port, &mtu).unwrap();
    assert!(start.elapsed() >= Duration::from_millis(50));
    assert_eq!(factory.pending_responses(), 0);
    assert_eq!(factory.waits(), vec![commands::GET_RESPONSE]);
}

#[test]
fn test_sync_wait_times_out() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);
    extension(&ri, ExtensionCommand::SyncMode(true)).unwrap();

    let err = ri
        .set(
            SaiObjectType::Port,
            &ObjectKey::Oid(0x1000000000001),
            &SaiAttribute::new(port_attr::MTU, SaiAttributeValue::U32(1500)),
        )
        .unwrap_err();
    assert!(matches!(err, SaiError::Timeout { .. }));
    assert_eq!(err.status(), SaiStatus::Failure);
    assert_eq!(factory.waits().len(), 1);
}

#[test]
fn test_failed_sync_create_reissues_handle() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);
    extension(&ri, ExtensionCommand::SyncMode(true)).unwrap();
    assert!(ri.is_sync_mode());

    factory.respond(commands::GET_RESPONSE, SaiStatus::Failure, vec![]);
    let err = ri.create(SaiObjectType::Port, SWITCH_ID, &speed(10)).unwrap_err();
    assert_eq!(err.status(), SaiStatus::Failure);
    let failed = vid::construct_object_id(SaiObjectType::Port, 0, 1, 0);
    assert_eq!(
        factory.last_request().unwrap().key,
        format!("SAI_OBJECT_TYPE_PORT:{}", sonic_sai::serialize_object_id(failed))
    );

    factory.respond(commands::GET_RESPONSE, SaiStatus::Success, vec![]);
    let port = ri.create(SaiObjectType::Port, SWITCH_ID, &speed(10)).unwrap();
    assert_eq!(port, failed);
    assert_eq!(factory.waits(), vec![commands::GET_RESPONSE, commands::GET_RESPONSE]);
}

#[test]
fn test_sync_remove_releases_handle() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);
    extension(&ri, ExtensionCommand::SyncMode(true)).unwrap();

    factory.respond(commands::GET_RESPONSE, SaiStatus::Success, vec![]);
    let first = ri.create(SaiObjectType::Vlan, SWITCH_ID, &[]).unwrap();

    factory.respond(commands::GET_RESPONSE, SaiStatus::Success, vec![]);
    ri.remove(SaiObjectType::Vlan, &ObjectKey::Oid(first)).unwrap();
    let req = factory.last_request().unwrap();
    assert_eq!(req.op, commands::REMOVE);
    assert!(req.fvs.is_empty());

    factory.respond(commands::GET_RESPONSE, SaiStatus::Success, vec![]);
    assert_eq!(ri.create(SaiObjectType::Vlan, SWITCH_ID, &[]).unwrap(), first);
}

#[test]
fn test_get_waits_in_async_mode() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);
    let port = ObjectKey::Oid(0x1000000000123);

    factory.respond(
        commands::GET_RESPONSE,
        SaiStatus::Success,
        vec![
            fv("SAI_PORT_ATTR_SPEED", "100000"),
            fv("SAI_PORT_ATTR_HW_LANE_LIST", "4:1,2,3,4"),
        ],
    );
    let mut attrs = [
        SaiAttribute::new(port_attr::SPEED, SaiAttributeValue::U32(0)),
        SaiAttribute::new(
            port_attr::HW_LANE_LIST,
            SaiAttributeValue::U32List(SaiList::with_capacity(4)),
        ),
    ];
    ri.get(SaiObjectType::Port, &port, &mut attrs).unwrap();

    let req = factory.last_request().unwrap();
    assert_eq!(req.key, "SAI_OBJECT_TYPE_PORT:oid:0x1000000000123");
    assert_eq!(req.op, commands::GET);
    assert_eq!(req.fvs.len(), 2);
    assert_eq!(attrs[0].value, SaiAttributeValue::U32(100_000));
    assert_eq!(
        attrs[1].value,
        SaiAttributeValue::U32List(SaiList::from_vec(vec![1, 2, 3, 4]))
    );
}

#[test]
fn test_get_overflow_writes_counts_only() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);

    factory.respond(
        commands::GET_RESPONSE,
        SaiStatus::BufferOverflow,
        vec![fv("SAI_PORT_ATTR_HW_LANE_LIST", "8:null")],
    );
    let mut attrs = [SaiAttribute::new(
        port_attr::HW_LANE_LIST,
        SaiAttributeValue::U32List(SaiList::with_capacity(2)),
    )];
    let err = ri
        .get(SaiObjectType::Port, &ObjectKey::Oid(0x1000000000001), &mut attrs)
        .unwrap_err();
    assert_eq!(err.status(), SaiStatus::BufferOverflow);
    assert_eq!(
        attrs[0].value,
        SaiAttributeValue::U32List(SaiList {
            count: 8,
            list: vec![0, 0]
        })
    );
}

#[test]
fn test_get_stats() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);

    factory.respond(
        commands::GET_RESPONSE,
        SaiStatus::Success,
        vec![
            fv("SAI_PORT_STAT_IF_IN_OCTETS", "10"),
            fv("SAI_PORT_STAT_IF_OUT_OCTETS", "20"),
        ],
    );
    let values = ri
        .get_stats(SaiObjectType::Port, 0x1000000000001, &[0, 9])
        .unwrap();
    assert_eq!(values, vec![10, 20]);

    let req = factory.last_request().unwrap();
    assert_eq!(req.op, commands::GET_STATS);
    assert_eq!(req.key, "SAI_OBJECT_TYPE_PORT:oid:0x1000000000001");
    assert_eq!(
        req.fvs.iter().map(|(f, _)| f.as_str()).collect::<Vec<_>>(),
        vec!["SAI_PORT_STAT_IF_IN_OCTETS", "SAI_PORT_STAT_IF_OUT_OCTETS"]
    );
}

#[test]
fn test_sync_bulk_create_reports_per_item() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);
    extension(&ri, ExtensionCommand::SyncMode(true)).unwrap();

    factory.respond(
        commands::GET_RESPONSE,
        SaiStatus::Failure,
        vec![
            fv("SAI_STATUS_SUCCESS", ""),
            fv("SAI_STATUS_FAILURE", ""),
            fv("SAI_STATUS_SUCCESS", ""),
        ],
    );
    let lists = vec![speed(1), speed(2), speed(3)];
    let outcome = ri
        .bulk_create(SaiObjectType::Port, SWITCH_ID, &lists, BulkOpErrorMode::IgnoreError)
        .unwrap();

    let req = factory.last_request().unwrap();
    assert_eq!(req.key, "SAI_OBJECT_TYPE_PORT:3");
    assert_eq!(req.op, commands::BULK_CREATE);
    assert_eq!(req.fvs[1].1, "SAI_PORT_ATTR_SPEED=2");

    assert_eq!(outcome.status, SaiStatus::Failure);
    assert_eq!(
        outcome.object_statuses,
        vec![SaiStatus::Success, SaiStatus::Failure, SaiStatus::Success]
    );
    assert_eq!(outcome.object_ids[1], NULL_OBJECT_ID);
    assert_eq!(vid::object_counter(outcome.object_ids[0]), 1);
    assert_eq!(vid::object_counter(outcome.object_ids[2]), 3);

    factory.respond(commands::GET_RESPONSE, SaiStatus::Success, vec![]);
    let reused = ri.create(SaiObjectType::Port, SWITCH_ID, &speed(4)).unwrap();
    assert_eq!(vid::object_counter(reused), 2);
}

#[test]
#[should_panic(expected = "wrong number of statuses")]
fn test_bulk_status_count_mismatch_panics() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);
    extension(&ri, ExtensionCommand::SyncMode(true)).unwrap();

    factory.respond(
        commands::GET_RESPONSE,
        SaiStatus::Success,
        vec![fv("SAI_STATUS_SUCCESS", "")],
    );
    let _ = ri.bulk_create(
        SaiObjectType::Port,
        SWITCH_ID,
        &[speed(1), speed(2)],
        BulkOpErrorMode::StopOnError,
    );
}

#[test]
fn test_async_bulk_reports_success() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);

    let keys = [ObjectKey::Oid(0x1000000000001), ObjectKey::Oid(0x1000000000002)];
    let outcome = ri
        .bulk_remove(SaiObjectType::Port, &keys, BulkOpErrorMode::StopOnError)
        .unwrap();
    assert_eq!(outcome.status, SaiStatus::Success);
    assert_eq!(outcome.object_statuses, vec![SaiStatus::Success; 2]);
    assert!(factory.waits().is_empty());

    let empty = ri.bulk_remove(SaiObjectType::Port, &[], BulkOpErrorMode::StopOnError);
    assert_eq!(empty.unwrap_err().status(), SaiStatus::InvalidParameter);
}

#[test]
fn test_pipeline_rejected_in_sync_mode() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);

    extension(&ri, ExtensionCommand::UsePipeline(true)).unwrap();
    assert!(factory.is_buffered());

    extension(&ri, ExtensionCommand::SyncMode(true)).unwrap();
    assert!(!factory.is_buffered());

    let err = extension(&ri, ExtensionCommand::UsePipeline(true)).unwrap_err();
    assert_eq!(err.status(), SaiStatus::NotSupported);
    assert!(!factory.is_buffered());
}

#[test]
fn test_zmq_communication_mode_is_sticky() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);
    assert_eq!(ri.communication_mode(), CommunicationMode::RedisAsync);

    extension(&ri, ExtensionCommand::CommunicationMode(CommunicationMode::RedisAsync)).unwrap();
    assert!(factory.is_buffered());
    assert!(!ri.is_sync_mode());

    extension(&ri, ExtensionCommand::CommunicationMode(CommunicationMode::ZmqSync)).unwrap();
    assert_eq!(ri.communication_mode(), CommunicationMode::ZmqSync);
    assert!(ri.is_sync_mode());
    assert!(!factory.is_buffered());

    extension(&ri, ExtensionCommand::CommunicationMode(CommunicationMode::RedisAsync)).unwrap();
    assert_eq!(ri.communication_mode(), CommunicationMode::ZmqSync);
    assert_eq!(
        factory.channels(),
        vec![
            ChannelKind::Redis,
            ChannelKind::Redis,
            ChannelKind::ZeroMq,
            ChannelKind::ZeroMq
        ]
    );
}

#[test]
fn test_zmq_context_starts_synchronous() {
    let factory = MockChannelFactory::default();
    let config = ContextConfig::new(1, "zmq").with_switch(0, "").unwrap().with_zmq(true);
    let ri = RemoteInterface::new(Arc::new(config), Arc::new(factory.clone()));
    ri.api_initialize().unwrap();

    assert_eq!(factory.channels(), vec![ChannelKind::ZeroMq]);
    assert!(ri.is_sync_mode());
    extension(&ri, ExtensionCommand::SyncMode(false)).unwrap();
    assert!(ri.is_sync_mode());
}

#[test]
#[should_panic(expected = "invalid communication mode")]
fn test_unknown_communication_mode_panics() {
    let (_factory, ri) = setup(SimpleVidIndexGenerator::new());
    let _ = ri.set(
        SaiObjectType::Switch,
        &ObjectKey::Oid(SWITCH_ID),
        &SaiAttribute::new(
            redis_switch_attr::REDIS_COMMUNICATION_MODE,
            SaiAttributeValue::S32(7),
        ),
    );
}

#[test]
fn test_response_timeout_reaches_channel() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    extension(&ri, ExtensionCommand::ResponseTimeout(Duration::from_millis(1500))).unwrap();
    assert_eq!(ri.response_timeout(), Duration::from_millis(1500));
    assert_eq!(factory.state.lock().response_timeout, Duration::from_millis(1500));
}

#[test]
fn test_context_attribute_rejected_outside_facade() {
    let (_factory, ri) = setup(SimpleVidIndexGenerator::new());
    let err = extension(&ri, ExtensionCommand::Context(1)).unwrap_err();
    assert_eq!(err.status(), SaiStatus::Failure);
}

#[test]
fn test_init_view_drops_local_state() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);
    assert!(ri.contains_switch(SWITCH_ID));

    factory.respond(commands::NOTIFY, SaiStatus::Success, vec![]);
    extension(&ri, ExtensionCommand::NotifySyncd(NotifySyncd::InitView)).unwrap();
    let req = factory.last_request().unwrap();
    assert_eq!(req.key, "SAI_REDIS_NOTIFY_SYNCD_INIT_VIEW");
    assert_eq!(req.op, commands::NOTIFY);
    assert!(ri.is_init_view_mode());
    assert!(!ri.contains_switch(SWITCH_ID));

    factory.respond(commands::NOTIFY, SaiStatus::Success, vec![]);
    ri.notify_syncd(SWITCH_ID, NotifySyncd::ApplyView).unwrap();
    assert!(!ri.is_init_view_mode());
}

#[test]
fn test_flex_counter_group_set_and_delete() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());

    let mut params = sonic_sairedis::FlexCounterGroupParams::new("PORT_STAT_COUNTER");
    params.poll_interval = Some("1000".into());
    extension(&ri, ExtensionCommand::FlexCounterGroup(params)).unwrap();
    let req = factory.last_request().unwrap();
    assert_eq!(req.op, commands::FLEX_COUNTER_SET_GROUP);
    assert_eq!(req.fvs, vec![fv("POLL_INTERVAL", "1000")]);

    let bare = sonic_sairedis::FlexCounterGroupParams::new("PORT_STAT_COUNTER");
    extension(&ri, ExtensionCommand::FlexCounterGroup(bare)).unwrap();
    let req = factory.last_request().unwrap();
    assert_eq!(req.key, "PORT_STAT_COUNTER");
    assert_eq!(req.op, commands::FLEX_COUNTER_DEL_GROUP);
}

#[test]
fn test_notification_reaches_switch_callback() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let cb: PortStateChangeFn = Arc::new(move |data: &[PortOperStatusData]| {
        sink.lock().extend(data.iter().map(|d| d.port_id));
    });
    ri.create(
        SaiObjectType::Switch,
        NULL_OBJECT_ID,
        &init_switch(vec![SaiAttribute::new(
            switch_attr::PORT_STATE_CHANGE_NOTIFY,
            SaiAttributeValue::Pointer(SaiPointer::new(cb)),
        )]),
    )
    .unwrap();

    factory.notify(
        PORT_STATE_CHANGE,
        r#"[{"port_id":"oid:0x1000000000002","port_state":"SAI_PORT_OPER_STATUS_UP"}]"#,
    );
    // owned by no known switch
    factory.notify(
        PORT_STATE_CHANGE,
        r#"[{"port_id":"oid:0x101000000000002","port_state":"SAI_PORT_OPER_STATUS_UP"}]"#,
    );
    factory.notify(PORT_STATE_CHANGE, "garbage");

    assert_eq!(*seen.lock(), vec![0x1000000000002]);
}

#[test]
fn test_connect_to_existing_switch() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    let connect = [SaiAttribute::new(
        switch_attr::INIT_SWITCH,
        SaiAttributeValue::Bool(false),
    )];

    let err = ri
        .create(SaiObjectType::Switch, NULL_OBJECT_ID, &connect)
        .unwrap_err();
    assert_eq!(err.status(), SaiStatus::ItemNotFound);

    factory.set_table(vec![
        ("SAI_OBJECT_TYPE_SWITCH:oid:0x21000000000000".into(), vec![]),
        (
            "SAI_OBJECT_TYPE_PORT:oid:0x1000000000005".into(),
            vec![fv("SAI_PORT_ATTR_SPEED", "100000")],
        ),
    ]);
    let switch_id = ri
        .create(SaiObjectType::Switch, NULL_OBJECT_ID, &connect)
        .unwrap();
    assert_eq!(switch_id, SWITCH_ID);
    assert!(ri.contains_switch(SWITCH_ID));
    assert!(factory.requests().is_empty());
    assert_eq!(ri.table_dump()[&SWITCH_ID].len(), 2);
}

#[test]
fn test_lifecycle() {
    let factory = MockChannelFactory::default();
    let config = ContextConfig::new(0, "syncd").with_switch(0, "").unwrap();
    let ri = RemoteInterface::new(Arc::new(config), Arc::new(factory.clone()));

    let err = ri.create(SaiObjectType::Port, SWITCH_ID, &[]).unwrap_err();
    assert_eq!(err.status(), SaiStatus::Uninitialized);
    assert!(ri.api_uninitialize().is_err());

    ri.api_initialize().unwrap();
    assert!(ri.api_initialize().is_err());
    assert!(ri.is_initialized());
    assert!(!ri.is_buffered());

    ri.api_uninitialize().unwrap();
    assert!(!ri.is_initialized());
    let err = ri
        .get_stats(SaiObjectType::Port, 0x1000000000001, &[0])
        .unwrap_err();
    assert_eq!(err.status(), SaiStatus::Uninitialized);
}

fn speed_and_lanes(lanes: usize) -> Vec<SaiAttribute> {
    vec![
        SaiAttribute::new(port_attr::SPEED, SaiAttributeValue::U32(0)),
        SaiAttribute::new(
            port_attr::HW_LANE_LIST,
            SaiAttributeValue::U32List(SaiList::with_capacity(lanes)),
        ),
    ]
}

#[test]
fn test_bulk_get_decodes_each_item() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);

    factory.respond(
        commands::GET_RESPONSE,
        SaiStatus::Failure,
        vec![
            fv(
                "SAI_STATUS_SUCCESS",
                "SAI_PORT_ATTR_SPEED=25000|SAI_PORT_ATTR_HW_LANE_LIST=2:5,6",
            ),
            fv(
                "SAI_STATUS_BUFFER_OVERFLOW",
                "SAI_PORT_ATTR_SPEED=0|SAI_PORT_ATTR_HW_LANE_LIST=4:null",
            ),
            fv("SAI_STATUS_FAILURE", ""),
            fv(
                "SAI_STATUS_SUCCESS",
                "SAI_PORT_ATTR_SPEED=fast|SAI_PORT_ATTR_HW_LANE_LIST=2:1,2",
            ),
        ],
    );
    let keys: Vec<ObjectKey> = (1..=4).map(|i| ObjectKey::Oid(0x1000000000000 + i)).collect();
    let mut lists = vec![speed_and_lanes(2); 4];
    let outcome = ri
        .bulk_get(SaiObjectType::Port, &keys, &mut lists, BulkOpErrorMode::IgnoreError)
        .unwrap();

    let req = factory.last_request().unwrap();
    assert_eq!(req.key, "SAI_OBJECT_TYPE_PORT:4");
    assert_eq!(req.op, commands::BULK_GET);
    assert_eq!(
        req.fvs[0],
        fv(
            "oid:0x1000000000001",
            "SAI_PORT_ATTR_SPEED=0|SAI_PORT_ATTR_HW_LANE_LIST=2:0,0"
        )
    );
    assert_eq!(factory.waits(), vec![commands::GET_RESPONSE]);

    assert_eq!(outcome.status, SaiStatus::Failure);
    assert_eq!(
        outcome.object_statuses,
        vec![
            SaiStatus::Success,
            SaiStatus::BufferOverflow,
            SaiStatus::Failure,
            SaiStatus::Failure
        ]
    );

    assert_eq!(lists[0][0].value, SaiAttributeValue::U32(25_000));
    assert_eq!(
        lists[0][1].value,
        SaiAttributeValue::U32List(SaiList::from_vec(vec![5, 6]))
    );
    assert_eq!(
        lists[1][1].value,
        SaiAttributeValue::U32List(SaiList {
            count: 4,
            list: vec![0, 0]
        })
    );
    assert_eq!(lists[2], speed_and_lanes(2));
    assert_eq!(lists[3][0].value, SaiAttributeValue::U32(0));
}

#[test]
fn test_sync_bulk_set() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);
    extension(&ri, ExtensionCommand::SyncMode(true)).unwrap();

    factory.respond(
        commands::GET_RESPONSE,
        SaiStatus::Failure,
        vec![
            fv("SAI_STATUS_SUCCESS", ""),
            fv("SAI_STATUS_INVALID_PARAMETER", ""),
        ],
    );
    let keys = [ObjectKey::Oid(0x1000000000001), ObjectKey::Oid(0x1000000000002)];
    let attrs = [
        SaiAttribute::new(port_attr::MTU, SaiAttributeValue::U32(9100)),
        SaiAttribute::new(port_attr::MTU, SaiAttributeValue::U32(1500)),
    ];
    let outcome = ri
        .bulk_set(SaiObjectType::Port, &keys, &attrs, BulkOpErrorMode::StopOnError)
        .unwrap();

    let req = factory.last_request().unwrap();
    assert_eq!(req.key, "SAI_OBJECT_TYPE_PORT:2");
    assert_eq!(req.op, commands::BULK_SET);
    assert_eq!(
        req.fvs,
        vec![
            fv("oid:0x1000000000001", "SAI_PORT_ATTR_MTU=9100"),
            fv("oid:0x1000000000002", "SAI_PORT_ATTR_MTU=1500"),
        ]
    );
    assert_eq!(
        outcome.object_statuses,
        vec![SaiStatus::Success, SaiStatus::InvalidParameter]
    );
    assert_eq!(
        outcome.into_result().unwrap_err().status(),
        SaiStatus::Failure
    );

    let mismatched = ri.bulk_set(
        SaiObjectType::Port,
        &keys,
        &attrs[..1],
        BulkOpErrorMode::StopOnError,
    );
    assert_eq!(mismatched.unwrap_err().status(), SaiStatus::InvalidParameter);
}

#[test]
fn test_query_attribute_capability() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);

    factory.respond(
        commands::ATTR_CAPABILITY_RESPONSE,
        SaiStatus::Success,
        vec![
            fv("CREATE_IMPLEMENTED", "true"),
            fv("SET_IMPLEMENTED", "false"),
            fv("GET_IMPLEMENTED", "true"),
        ],
    );
    let capability = ri
        .query_attribute_capability(SWITCH_ID, SaiObjectType::Port, port_attr::SPEED)
        .unwrap();
    assert_eq!(
        capability,
        AttrCapability {
            create_implemented: true,
            set_implemented: false,
            get_implemented: true,
        }
    );

    let req = factory.last_request().unwrap();
    assert_eq!(req.key, "oid:0x21000000000000");
    assert_eq!(req.op, commands::ATTR_CAPABILITY_QUERY);
    assert_eq!(
        req.fvs,
        vec![
            fv("OBJECT_TYPE", "SAI_OBJECT_TYPE_PORT"),
            fv("ATTR_ID", "SAI_PORT_ATTR_SPEED"),
        ]
    );

    factory.respond(
        commands::ATTR_CAPABILITY_RESPONSE,
        SaiStatus::Success,
        vec![fv("CREATE_IMPLEMENTED", "true")],
    );
    let short = ri.query_attribute_capability(SWITCH_ID, SaiObjectType::Port, port_attr::SPEED);
    assert_eq!(short.unwrap_err().status(), SaiStatus::Failure);
}

#[test]
fn test_query_enum_values_capability() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);

    factory.respond(
        commands::ATTR_ENUM_VALUES_CAPABILITY_RESPONSE,
        SaiStatus::Success,
        vec![fv("ENUM_CAPABILITY", "1,3"), fv("ENUM_COUNT", "2")],
    );
    let mut values = SaiList::from_vec(vec![9, 9, 9, 9]);
    ri.query_attribute_enum_values_capability(
        SWITCH_ID,
        SaiObjectType::Port,
        port_attr::FEC_MODE,
        &mut values,
    )
    .unwrap();
    assert_eq!(
        values,
        SaiList {
            count: 2,
            list: vec![1, 3, 0, 0]
        }
    );
    let req = factory.last_request().unwrap();
    assert_eq!(req.op, commands::ATTR_ENUM_VALUES_CAPABILITY_QUERY);
    assert_eq!(req.fvs[1], fv("ATTR_ID", "SAI_PORT_ATTR_FEC_MODE"));
    assert_eq!(req.fvs[2], fv("LIST_SIZE", "4"));

    factory.respond(
        commands::ATTR_ENUM_VALUES_CAPABILITY_RESPONSE,
        SaiStatus::BufferOverflow,
        vec![fv("ENUM_COUNT", "5")],
    );
    let mut small = SaiList::from_vec(vec![9]);
    let err = ri
        .query_attribute_enum_values_capability(
            SWITCH_ID,
            SaiObjectType::Port,
            port_attr::FEC_MODE,
            &mut small,
        )
        .unwrap_err();
    assert_eq!(err.status(), SaiStatus::BufferOverflow);
    assert_eq!(
        small,
        SaiList {
            count: 5,
            list: vec![0]
        }
    );
    assert_eq!(factory.last_request().unwrap().fvs[2], fv("LIST_SIZE", "1"));
}

#[test]
fn test_query_stats_capability() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);

    factory.respond(
        commands::STATS_CAPABILITY_RESPONSE,
        SaiStatus::Success,
        vec![
            fv("STAT_ENUM", "0,9"),
            fv("STAT_MODES", "1,3"),
            fv("STAT_COUNT", "2"),
        ],
    );
    let mut caps = SaiList::<StatCapability>::with_capacity(3);
    ri.query_stats_capability(SWITCH_ID, SaiObjectType::Port, &mut caps)
        .unwrap();
    assert_eq!(caps.count, 2);
    assert_eq!(
        caps.list,
        vec![
            StatCapability {
                stat_enum: 0,
                stat_modes: 1
            },
            StatCapability {
                stat_enum: 9,
                stat_modes: 3
            },
            StatCapability::default(),
        ]
    );
    let req = factory.last_request().unwrap();
    assert_eq!(req.op, commands::STATS_CAPABILITY_QUERY);
    assert_eq!(
        req.fvs,
        vec![
            fv("OBJECT_TYPE", "SAI_OBJECT_TYPE_PORT"),
            fv("LIST_SIZE", "3"),
        ]
    );

    factory.respond(
        commands::STATS_CAPABILITY_RESPONSE,
        SaiStatus::BufferOverflow,
        vec![fv("STAT_COUNT", "17")],
    );
    let mut small = SaiList::<StatCapability>::with_capacity(1);
    let err = ri
        .query_stats_capability(SWITCH_ID, SaiObjectType::Port, &mut small)
        .unwrap_err();
    assert_eq!(err.status(), SaiStatus::BufferOverflow);
    assert_eq!(small.count, 17);
    assert_eq!(small.list, vec![StatCapability::default()]);
}

#[test]
fn test_object_type_get_availability() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);

    factory.respond(
        commands::OBJECT_TYPE_GET_AVAILABILITY_RESPONSE,
        SaiStatus::Success,
        vec![fv("COUNT", "1024")],
    );
    let available = ri
        .object_type_get_availability(SWITCH_ID, SaiObjectType::RouteEntry, &[])
        .unwrap();
    assert_eq!(available, 1024);

    let req = factory.last_request().unwrap();
    assert_eq!(req.key, "oid:0x21000000000000");
    assert_eq!(req.op, commands::OBJECT_TYPE_GET_AVAILABILITY_QUERY);
    assert_eq!(req.fvs, vec![fv("OBJECT_TYPE", "SAI_OBJECT_TYPE_ROUTE_ENTRY")]);
    assert_eq!(
        factory.waits(),
        vec![commands::OBJECT_TYPE_GET_AVAILABILITY_RESPONSE]
    );

    factory.respond(
        commands::OBJECT_TYPE_GET_AVAILABILITY_RESPONSE,
        SaiStatus::NotSupported,
        vec![],
    );
    let err = ri
        .object_type_get_availability(SWITCH_ID, SaiObjectType::RouteEntry, &[])
        .unwrap_err();
    assert_eq!(err.status(), SaiStatus::NotSupported);
}

#[test]
fn test_flush_fdb_entries_waits_for_flush_response() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);

    let attrs = [SaiAttribute::new(2, SaiAttributeValue::S32(1))];
    factory.respond(commands::FLUSH_RESPONSE, SaiStatus::Success, vec![]);
    ri.flush_fdb_entries(SWITCH_ID, &attrs).unwrap();

    let req = factory.last_request().unwrap();
    assert_eq!(req.key, "SAI_OBJECT_TYPE_FDB_FLUSH:oid:0x21000000000000");
    assert_eq!(req.op, commands::FLUSH);
    assert_eq!(req.fvs, vec![fv("SAI_FDB_FLUSH_ATTR_ENTRY_TYPE", "1")]);
    assert_eq!(factory.waits(), vec![commands::FLUSH_RESPONSE]);

    factory.respond(commands::FLUSH_RESPONSE, SaiStatus::Failure, vec![]);
    let err = ri.flush_fdb_entries(SWITCH_ID, &attrs).unwrap_err();
    assert_eq!(err.status(), SaiStatus::Failure);
}

#[test]
fn test_clear_stats() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);

    factory.respond(commands::GET_RESPONSE, SaiStatus::Success, vec![]);
    ri.clear_stats(SaiObjectType::Port, 0x1000000000001, &[0, 9])
        .unwrap();

    let req = factory.last_request().unwrap();
    assert_eq!(req.key, "SAI_OBJECT_TYPE_PORT:oid:0x1000000000001");
    assert_eq!(req.op, commands::CLEAR_STATS);
    assert_eq!(
        req.fvs,
        vec![
            fv("SAI_PORT_STAT_IF_IN_OCTETS", ""),
            fv("SAI_PORT_STAT_IF_OUT_OCTETS", ""),
        ]
    );
    assert_eq!(factory.waits(), vec![commands::GET_RESPONSE]);

    factory.respond(commands::GET_RESPONSE, SaiStatus::NotSupported, vec![]);
    let err = ri
        .clear_stats(SaiObjectType::Port, 0x1000000000001, &[0])
        .unwrap_err();
    assert_eq!(err.status(), SaiStatus::NotSupported);
}

#[test]
fn test_entry_create_and_remove_use_entry_key() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);
    let first = ri.create(SaiObjectType::Port, SWITCH_ID, &speed(10)).unwrap();
    assert_eq!(vid::object_counter(first), 1);

    let entry = ObjectKey::Fdb(FdbEntry {
        bvid: 0x26000000000001,
        mac: "00:11:22:33:44:55".parse().unwrap(),
        switch_id: SWITCH_ID,
    });
    let expected_key = format!("SAI_OBJECT_TYPE_FDB_ENTRY:{}", entry.serialize());

    ri.create_entry(
        SaiObjectType::FdbEntry,
        &entry,
        &[SaiAttribute::new(1, SaiAttributeValue::S32(1))],
    )
    .unwrap();
    let req = factory.last_request().unwrap();
    assert_eq!(req.key, expected_key);
    assert_eq!(req.op, commands::CREATE);
    assert_eq!(req.fvs, vec![fv("SAI_FDB_ENTRY_ATTR_PACKET_ACTION", "1")]);

    ri.remove(SaiObjectType::FdbEntry, &entry).unwrap();
    let req = factory.last_request().unwrap();
    assert_eq!(req.key, expected_key);
    assert_eq!(req.op, commands::REMOVE);

    // entries neither take nor give back handles
    let second = ri.create(SaiObjectType::Port, SWITCH_ID, &speed(10)).unwrap();
    assert_eq!(vid::object_counter(second), 2);

    let by_oid = ri.create_entry(SaiObjectType::FdbEntry, &ObjectKey::Oid(first), &[]);
    assert_eq!(by_oid.unwrap_err().status(), SaiStatus::InvalidParameter);
    let wrong_type = ri.create_entry(SaiObjectType::RouteEntry, &entry, &[]);
    assert_eq!(wrong_type.unwrap_err().status(), SaiStatus::InvalidParameter);
}

#[test]
fn test_redis_sync_mode_rebuilds_unbuffered_channel() {
    let (factory, ri) = setup(SimpleVidIndexGenerator::new());
    create_switch(&ri);

    extension(&ri, ExtensionCommand::UsePipeline(true)).unwrap();
    assert!(factory.is_buffered());

    extension(&ri, ExtensionCommand::CommunicationMode(CommunicationMode::RedisSync)).unwrap();
    assert_eq!(ri.communication_mode(), CommunicationMode::RedisSync);
    assert_eq!(factory.channels(), vec![ChannelKind::Redis, ChannelKind::Redis]);
    assert!(ri.is_sync_mode());
    assert!(!factory.is_buffered());

    factory.delay_responses(Duration::from_millis(30));
    factory.respond(commands::GET_RESPONSE, SaiStatus::Success, vec![]);
    let start = Instant::now();
    ri.set(
        SaiObjectType::Port,
        &ObjectKey::Oid(0x1000000000001),
        &SaiAttribute::new(port_attr::MTU, SaiAttributeValue::U32(9100)),
    )
    .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(30));
    assert_eq!(factory.waits(), vec![commands::GET_RESPONSE]);

    let err = extension(&ri, ExtensionCommand::UsePipeline(true)).unwrap_err();
    assert_eq!(err.status(), SaiStatus::NotSupported);
}
