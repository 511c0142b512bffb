//! Wire constants: packet tags, field widths, payload lengths and bit masks.

pub const PLAYER_UPDATE: u8 = 13;
pub const PLAYER_HP: u8 = 16;
pub const TILE: u8 = 17;
pub const TILE_SEND_SQUARE: u8 = 20;
pub const ITEM_DROP: u8 = 21;
pub const NPC_UPDATE: u8 = 23;
pub const PROJECTILE_NEW: u8 = 27;
pub const PROJECTILE_DESTROY: u8 = 29;
pub const ZONES: u8 = 36;
pub const NPC_TALK: u8 = 40;
pub const PLACE_OBJECT: u8 = 79;
pub const UPDATE_TILE_ENTITY: u8 = 86;
pub const PLACE_TILE_ENTITY: u8 = 87;

pub const U8_WIDTH: usize = 1;
pub const U16_WIDTH: usize = 2;

/// x:i16, y:i16, entityKind:u8
pub const PLACE_TILE_ENTITY_LEN: usize = 2 * U16_WIDTH + U8_WIDTH;
/// x:i16, y:i16, objectType:i16, style:i16
pub const PLACE_OBJECT_LEN: usize = 4 * U16_WIDTH;
/// action:u8, x:i16, y:i16, var1:i16, var2:u8
pub const TILE_LEN: usize = U8_WIDTH + 3 * U16_WIDTH + U8_WIDTH;
/// header:u16, x:i16, y:i16 (changeType adds one byte when flagged)
pub const TILE_SEND_SQUARE_MIN_LEN: usize = 3 * U16_WIDTH;

pub const TILE_SQUARE_SIZE_MASK: u16 = 0x7FFF;
pub const TILE_SQUARE_CHANGE_TYPE_FLAG: u16 = 0x8000;

/// `var1` value marking a tile edit as a failed (visual only) attempt.
pub const TILE_FAIL_MARKER: i16 = 1;

/// Tile-entity kind ids as reported by the server.
pub const TILE_ENTITY_ITEM_FRAME: u8 = 1;

/// Message framing on the game TCP stream: `u16` total length (prefix
/// included) followed by the type byte.
pub const FRAME_LENGTH_PREFIX: usize = 2;
pub const FRAME_HEADER_LEN: usize = FRAME_LENGTH_PREFIX + U8_WIDTH;

pub const DEFAULT_SERVER_PORT: u16 = 7777;
pub const DEFAULT_WORLD_WIDTH: i32 = 8400;
pub const DEFAULT_WORLD_HEIGHT: i32 = 2400;

/// Protocol names indexed by tag; index 0 is unused.
pub const PACKET_NAMES: [&str; 141] = [
    "Unknown",
    "ConnectRequest",
    "Disconnect",
    "ContinueConnecting",
    "PlayerInfo",
    "PlayerSlot",
    "ContinueConnecting2",
    "WorldInfo",
    "TileGetSection",
    "Status",
    "TileSendSection",
    "TileFrameSection",
    "PlayerSpawn",
    "PlayerUpdate",
    "PlayerActive",
    "Null",
    "PlayerHp",
    "Tile",
    "TimeSet",
    "DoorUse",
    "TileSendSquare",
    "ItemDrop",
    "ItemOwner",
    "NpcUpdate",
    "NpcItemStrike",
    "ChatText",
    "PlayerDamage",
    "ProjectileNew",
    "NpcStrike",
    "ProjectileDestroy",
    "TogglePvp",
    "ChestGetContents",
    "ChestItem",
    "ChestOpen",
    "PlaceChest",
    "EffectHeal",
    "Zones",
    "PasswordRequired",
    "PasswordSend",
    "RemoveItemOwner",
    "NpcTalk",
    "PlayerAnimation",
    "PlayerMana",
    "EffectMana",
    "PlayerKillMe",
    "PlayerTeam",
    "SignRead",
    "SignNew",
    "LiquidSet",
    "PlayerSpawnSelf",
    "PlayerBuff",
    "NpcSpecial",
    "ChestUnlock",
    "NpcAddBuff",
    "NpcUpdateBuff",
    "PlayerAddBuff",
    "UpdateNPCName",
    "UpdateGoodEvil",
    "PlayHarp",
    "HitSwitch",
    "UpdateNPCHome",
    "SpawnBossorInvasion",
    "PlayerDodge",
    "PaintTile",
    "PaintWall",
    "Teleport",
    "PlayerHealOther",
    "Placeholder",
    "ClientUUID",
    "ChestName",
    "CatchNPC",
    "ReleaseNPC",
    "TravellingMerchantInventory",
    "TeleportationPotion",
    "AnglerQuest",
    "CompleteAnglerQuest",
    "NumberOfAnglerQuestsCompleted",
    "CreateTemporaryAnimation",
    "ReportInvasionProgress",
    "PlaceObject",
    "SyncPlayerChestIndex",
    "CreateCombatText",
    "LoadNetModule",
    "SetNPCKillCount",
    "SetPlayerStealth",
    "ForceItemIntoNearestChest",
    "UpdateTileEntity",
    "PlaceTileEntity",
    "TweakItem",
    "PlaceItemFrame",
    "UpdateItemDrop",
    "SyncEmoteBubble",
    "SyncExtraValue",
    "SocialHandshake",
    "Deprecated1",
    "KillPortal",
    "PlayerTeleportPortal",
    "NotifyPlayerNpcKilled",
    "NotifyPlayerOfEvent",
    "UpdateMinionTarget",
    "NpcTeleportPortal",
    "UpdateShieldStrengths",
    "NebulaLevelUp",
    "MoonLordCountdown",
    "NpcShopItem",
    "GemLockToggle",
    "PoofOfSmoke",
    "SmartTextMessage",
    "WiredCannonShot",
    "MassWireOperation",
    "MassWireOperationPay",
    "ToggleParty",
    "TreeGrowFX",
    "CrystalInvasionStart",
    "CrystalInvasionWipeAll",
    "MinionAttackTargetUpdate",
    "CrystalInvasionSendWaitTime",
    "PlayerHurtV2",
    "PlayerDeathV2",
    "CreateCombatTextExtended",
    "Emoji",
    "TileEntityDisplayDollItemSync",
    "RequestTileEntityInteraction",
    "WeaponsRackTryPlacing",
    "TileEntityHatRackItemSync",
    "SyncTilePicking",
    "SyncRevengeMarker",
    "RemoveRevengeMarker",
    "LandGolfBallInCup",
    "FinishedConnectingToServer",
    "FishOutNPC",
    "TamperWithNPC",
    "PlayLegacySound",
    "FoodPlatterTryPlacing",
    "UpdatePlayerLuckFactors",
    "DeadPlayer",
    "SyncCavernMonsterType",
    "RequestNPCBuffRemoval",
    "ClientSyncedInventory",
    "SetCountsAsHostForGameplay",
    "SetMiscEventValues",
];
